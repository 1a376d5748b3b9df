use crate::changes::{Changes, Delta};
use crate::header_space::Predicate;
use crate::model_manager::ModelManager;
use crate::ports::Ports;
use crate::traits::Set;
use fxhash::FxHashMap;
use log::{debug, trace};
use std::collections::hash_map::Entry;
use std::time::{Duration, Instant};

impl<P: Ports> ModelManager<P> {
    /// Aggregate the given `Changes` and apply them to the equivalence classes.
    ///
    /// Returns the predicates which were split off from an existing class and moved to
    /// a different one (the rest of the original class stays where it was). When a whole
    /// class changes its behaviour, nothing is reported for it. A class whose ports are not
    /// changed by a delta is left as is, and its overlap with the delta is not reported
    /// either. The returned predicates are pairwise disjoint.
    pub fn update(&mut self, mut changes: Changes) -> Vec<Predicate> {
        let start = Instant::now();
        changes.aggregate();
        self.statistics.change_aggregation += start.elapsed();

        let start = Instant::now();
        let mut ports_time = Duration::ZERO;
        let mut transferred = Vec::new();
        for delta in changes.all_deltas() {
            self.apply_delta(delta, &mut transferred, &mut ports_time);
            if cfg!(feature = "shields-up") {
                if let Err(error) = self.check_partition() {
                    panic!("Invalid partition after applying a delta: {}", error);
                }
            }
        }
        let elapsed = start.elapsed();

        debug!(
            "Applied {} deltas in {:?}: {} equivalence classes, {} transferred predicates.",
            changes.all_deltas().len(),
            elapsed,
            self.ports_to_predicate.len(),
            transferred.len()
        );
        self.statistics.deltas += changes.all_deltas().len();
        self.statistics.transferred += transferred.len();
        self.statistics.partition_update += elapsed;
        self.statistics.ports_construction += ports_time;
        changes.release();
        transferred
    }

    /// **(internal)** Move the part of every class covered by `delta` to the class of its
    /// new forwarding behaviour.
    fn apply_delta(
        &mut self,
        delta: &Delta,
        transferred: &mut Vec<Predicate>,
        ports_time: &mut Duration,
    ) {
        let mut remaining = delta.predicate().clone();
        let mut affected: Vec<(P, Predicate)> = Vec::new();
        for (ports, predicate) in &self.ports_to_predicate {
            if remaining.is_empty() {
                break;
            }
            let overlap = predicate.intersect(&remaining);
            if !overlap.is_empty() {
                remaining = remaining.minus(&overlap);
                affected.push((ports.clone(), overlap));
            }
        }

        // The transitions assign absolute ports, so a class which is the target of another
        // class is never modified itself.
        for (ports, overlap) in affected {
            let start = Instant::now();
            let new_ports = ports.create_with_changes(delta.transitions());
            *ports_time += start.elapsed();
            if new_ports == ports {
                continue;
            }

            let predicate = self
                .ports_to_predicate
                .remove(&ports)
                .unwrap_or_else(|| panic!("Equivalence class {:?} disappeared.", ports));
            let rest = predicate.minus(&overlap);
            if rest.is_empty() {
                trace!("Whole class transferred to {:?}.", new_ports);
            } else {
                self.ports_to_predicate.insert(ports, rest);
                transferred.push(overlap.clone());
            }
            insert_predicate(&mut self.ports_to_predicate, new_ports, overlap);
        }
    }
}

/// **(internal)** Add headers to the class of `ports`, creating it if necessary.
fn insert_predicate<P: Ports>(
    partition: &mut FxHashMap<P, Predicate>,
    ports: P,
    predicate: Predicate,
) {
    match partition.entry(ports) {
        Entry::Occupied(mut entry) => {
            let merged = entry.get().union(&predicate);
            entry.insert(merged);
        }
        Entry::Vacant(entry) => {
            entry.insert(predicate);
        }
    }
}
