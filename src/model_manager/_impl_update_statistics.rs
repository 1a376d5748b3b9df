use crate::model_manager::UpdateStatistics;
use std::fmt::{Display, Error, Formatter};
use std::time::Duration;

impl UpdateStatistics {
    /// The number of rule insertions and deletions processed so far.
    pub fn rule_edits(&self) -> usize {
        self.insertions + self.deletions
    }

    /// Total time spent in both update stages.
    pub fn total_time(&self) -> Duration {
        self.change_computation + self.change_aggregation + self.partition_update
    }
}

/// Microseconds per rule edit (zero when nothing was processed).
fn per_edit(duration: Duration, edits: usize) -> f64 {
    if edits == 0 {
        0.0
    } else {
        duration.as_secs_f64() * 1_000_000.0 / (edits as f64)
    }
}

impl Display for UpdateStatistics {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let edits = self.rule_edits();
        writeln!(
            f,
            "{} batches, {} insertions, {} deletions, {} atoms, {} deltas, {} transferred.",
            self.batches,
            self.insertions,
            self.deletions,
            self.change_atoms,
            self.deltas,
            self.transferred
        )?;
        let stages = [
            ("change computation", self.change_computation),
            ("change aggregation", self.change_aggregation),
            ("partition update", self.partition_update),
            ("  ports construction", self.ports_construction),
            ("total", self.total_time()),
        ];
        for (name, duration) in stages {
            writeln!(
                f,
                "{:<22} {:>10.3} ms {:>10.3} us/edit",
                name,
                duration.as_secs_f64() * 1000.0,
                per_edit(duration, edits)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::UpdateStatistics;
    use std::time::Duration;

    #[test]
    fn statistics_summary() {
        let statistics = UpdateStatistics {
            batches: 2,
            insertions: 3,
            deletions: 1,
            change_computation: Duration::from_millis(4),
            partition_update: Duration::from_millis(2),
            ..Default::default()
        };
        assert_eq!(4, statistics.rule_edits());
        assert_eq!(Duration::from_millis(6), statistics.total_time());

        let summary = statistics.to_string();
        assert!(summary.starts_with("2 batches, 3 insertions, 1 deletions"));
        assert!(summary.contains("1000.000 us/edit"));
        assert!(summary.contains("total"));
        assert!(UpdateStatistics::default().to_string().contains("0.000 us/edit"));
    }
}
