use crate::changes::Changes;
use crate::model_manager::{InstalledRule, ModelManager};
use crate::ports::Ports;
use crate::traits::Set;
use crate::trie_rules::RuleId;
use crate::Rule;
use fxhash::FxHashSet;
use log::{debug, info};
use std::time::Instant;

impl<P: Ports> ModelManager<P> {
    /// Install all given rules and compute the resulting changes of forwarding behaviour.
    ///
    /// See `apply_batch`.
    pub fn insert_batch(&mut self, insertions: &[Rule]) -> Changes {
        self.apply_batch(insertions, &[])
    }

    /// Install `insertions`, remove `deletions` and compute the resulting changes of
    /// forwarding behaviour (unaggregated atoms).
    ///
    /// The changes are computed against the rule set *after* the whole batch is applied.
    /// A rule which appears in both lists is ignored: it is neither installed nor removed
    /// and produces no changes.
    ///
    /// The returned `Changes` must be passed to `update` before the next batch is applied.
    ///
    /// Panics if a deleted rule is not installed, an inserted rule is already installed
    /// or invalid (see `check_rule`), or when deleting a default rule.
    pub fn apply_batch(&mut self, insertions: &[Rule], deletions: &[Rule]) -> Changes {
        let start = Instant::now();
        let inserted: FxHashSet<&Rule> = insertions.iter().collect();
        let deleted: FxHashSet<&Rule> = deletions.iter().collect();

        let mut removed: Vec<InstalledRule> = Vec::with_capacity(deletions.len());
        for rule in deletions {
            if inserted.contains(rule) {
                continue;
            }
            if *rule == Rule::default_for(rule.device()) {
                panic!("Cannot delete the default rule of {}.", rule.device());
            }
            removed.push(self.uninstall(rule));
        }

        let mut added: Vec<RuleId> = Vec::with_capacity(insertions.len());
        for rule in insertions {
            if deleted.contains(rule) {
                continue;
            }
            added.push(self.install(rule.clone()));
        }

        let mut changes = Changes::new();
        for rule in &removed {
            self.identify_deletion(rule, &mut changes);
        }
        for id in &added {
            self.identify_insertion(*id, &mut changes);
        }

        let elapsed = start.elapsed();
        let skipped = insertions.len() - added.len();
        debug!(
            "Batch #{}: {} insertions, {} deletions ({} cancelled) produced {} atoms in {:?}.",
            self.statistics.batches,
            added.len(),
            removed.len(),
            skipped,
            changes.atoms().len(),
            elapsed
        );
        if skipped > 0 {
            info!(
                "{} rules were both inserted and deleted in one batch and are ignored.",
                skipped
            );
        }

        self.statistics.batches += 1;
        self.statistics.insertions += added.len();
        self.statistics.deletions += removed.len();
        self.statistics.change_atoms += changes.atoms().len();
        self.statistics.change_computation += elapsed;
        changes
    }

    /// **(internal)** The newly installed rule takes over every header it matches, unless
    /// the header is matched by a rule of strictly higher priority.
    fn identify_insertion(&self, id: RuleId, changes: &mut Changes) {
        let width = self.header_space.address_width();
        let inserted = self.get_installed(id);
        let rule = &inserted.rule;

        let mut hit = inserted.bdd_match.clone();
        for other in self.device_index(rule).get_all_overlapping_with(rule, width) {
            if other == id {
                continue;
            }
            let other = self.get_installed(other);
            if other.rule.priority() > rule.priority() {
                hit = hit.minus(&other.bdd_match);
                if hit.is_empty() {
                    return;
                }
            }
        }
        changes.add(hit, None, rule.out_port());
    }

    /// **(internal)** Headers of the removed rule which are not matched by a rule of
    /// strictly higher priority fall through to the highest priority lower rule that
    /// matches them. Only headers whose port actually changes produce an atom.
    fn identify_deletion(&self, removed: &InstalledRule, changes: &mut Changes) {
        let width = self.header_space.address_width();
        let rule = &removed.rule;

        let mut candidates: Vec<&InstalledRule> = self
            .device_index(rule)
            .get_all_overlapping_with(rule, width)
            .into_iter()
            .map(|id| self.get_installed(id))
            .filter(|other| other.rule.priority() != rule.priority())
            .collect();
        candidates.sort_by(|a, b| b.rule.priority().cmp(&a.rule.priority()));

        let mut hit = removed.bdd_match.clone();
        for candidate in candidates {
            if hit.is_empty() {
                break;
            }
            if candidate.rule.priority() > rule.priority() {
                hit = hit.minus(&candidate.bdd_match);
                continue;
            }
            let overlap = hit.intersect(&candidate.bdd_match);
            if overlap.is_empty() {
                continue;
            }
            hit = hit.minus(&overlap);
            if candidate.rule.out_port() != rule.out_port() {
                changes.add(overlap, Some(rule.out_port()), candidate.rule.out_port());
            }
        }
    }
}
