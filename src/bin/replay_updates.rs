/*
   Replays a data plane followed by a script of rule updates and reports how the number of
   equivalence classes evolves, together with the time spent in the individual update stages.

   Usage: replay-updates <data-plane> [<updates>] [--width N] [--verbose]

   The data plane is inserted as a single batch. Each batch of the update script (batches are
   separated by blank lines) is then applied separately.
*/

use ec_model::parser::{DataPlane, UpdateBatch};
use ec_model::{ModelManager, PersistentPorts, Rule};
use fxhash::FxHashSet;
use simplelog::{Config, LevelFilter, SimpleLogger};
use std::convert::TryFrom;
use std::time::Instant;

const USAGE: &str = "Usage: replay-updates <data-plane> [<updates>] [--width N] [--verbose]";

struct Arguments {
    data_plane: String,
    updates: Option<String>,
    width: u16,
    verbose: bool,
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if let Err(error) = parse_arguments(&args).and_then(|it| replay(&it)) {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}

fn parse_arguments(args: &[String]) -> Result<Arguments, String> {
    let mut files = Vec::new();
    let mut width = 32;
    let mut verbose = false;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => verbose = true,
            "--width" => {
                let value = args.next().ok_or_else(|| USAGE.to_string())?;
                width = value
                    .parse()
                    .map_err(|_| format!("Invalid address width `{}`.", value))?;
            }
            _ if arg.starts_with("--") => {
                return Err(format!("Unknown option `{}`.\n{}", arg, USAGE));
            }
            _ => files.push(arg.clone()),
        }
    }
    if files.is_empty() || files.len() > 2 {
        return Err(USAGE.to_string());
    }
    Ok(Arguments {
        data_plane: files[0].clone(),
        updates: files.get(1).cloned(),
        width,
        verbose,
    })
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|error| format!("Cannot read `{}`: {}", path, error))
}

fn replay(args: &Arguments) -> Result<(), String> {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    SimpleLogger::init(level, Config::default()).map_err(|error| error.to_string())?;

    let data_plane = DataPlane::try_from(read_file(&args.data_plane)?.as_str())?;
    let (network, rules) = data_plane.into_parts();
    println!(
        "Loaded data plane with {} devices and {} rules.",
        network.num_devices(),
        rules.len()
    );

    let mut manager: ModelManager<PersistentPorts> =
        ModelManager::with_address_width(network, args.width)?;
    let batch = UpdateBatch::new(rules, Vec::new());
    let start = Instant::now();
    apply(&mut manager, &batch)?;
    println!(
        "Initial data plane: {} equivalence classes in {}ms.",
        manager.partition_size(),
        start.elapsed().as_millis()
    );

    if let Some(updates) = &args.updates {
        let batches = manager
            .as_network()
            .parse_update_script(&read_file(updates)?)?;
        let start = Instant::now();
        for (index, batch) in batches.iter().enumerate() {
            apply(&mut manager, batch)?;
            if args.verbose {
                println!(
                    "Batch {}: +{} -{} rules, {} equivalence classes.",
                    index + 1,
                    batch.insertions().len(),
                    batch.deletions().len(),
                    manager.partition_size()
                );
            }
        }
        println!(
            "Applied {} update batches: {} equivalence classes in {}ms.",
            batches.len(),
            manager.partition_size(),
            start.elapsed().as_millis()
        );
    }

    if let Err(error) = manager.check_partition() {
        return Err(format!("Model is inconsistent: {}", error));
    }
    print!("{}", manager.statistics());
    Ok(())
}

/// Validate the batch against the model, then apply it.
fn apply(manager: &mut ModelManager<PersistentPorts>, batch: &UpdateBatch) -> Result<(), String> {
    let insertions: FxHashSet<&Rule> = batch.insertions().iter().collect();
    let deletions: FxHashSet<&Rule> = batch.deletions().iter().collect();
    if insertions.len() != batch.insertions().len() || deletions.len() != batch.deletions().len()
    {
        return Err("Batch contains duplicate rules.".to_string());
    }
    for rule in batch.insertions() {
        manager.check_rule(rule)?;
        if manager.contains_rule(rule) && !deletions.contains(rule) {
            return Err(format!("Rule `{}` is already installed.", describe(manager, rule)));
        }
    }
    for rule in batch.deletions() {
        if insertions.contains(rule) {
            continue;
        }
        if *rule == Rule::default_for(rule.device()) {
            return Err(format!("Rule `{}` cannot be deleted.", describe(manager, rule)));
        }
        if !manager.contains_rule(rule) {
            return Err(format!("Rule `{}` is not installed.", describe(manager, rule)));
        }
    }
    let changes = manager.apply_batch(batch.insertions(), batch.deletions());
    manager.update(changes);
    Ok(())
}

fn describe(manager: &ModelManager<PersistentPorts>, rule: &Rule) -> String {
    manager.as_network().format_rule(rule)
}
