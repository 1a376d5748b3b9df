//! The incremental model of a network data plane.
//!
//! `ModelManager` stores all installed rules (indexed per device by `TrieRules`) and the
//! partition of the header space into equivalence classes. Each class is identified by its
//! forwarding behaviour (a `Ports` object). Updates are processed in two stages:
//!
//!  1. `apply_batch` (or `insert_batch`) modifies the installed rules and computes the
//!     `Changes` of forwarding behaviour caused by the batch.
//!  2. `update` folds the `Changes` into the equivalence classes and returns the header
//!     regions that were split off an existing class.
//!
//! The two stages are separate so that the caller can inspect (or combine) the changes
//! before applying them, but every `Changes` object must be applied to the same manager
//! that produced it, before the next batch is processed.

use crate::header_space::{HeaderSpace, Predicate};
use crate::ports::{PersistentPorts, Ports};
use crate::trie_rules::{RuleId, TrieRules};
use crate::{Network, Rule};
use fxhash::FxHashMap;
use std::time::Duration;

/// **(internal)** Computation of `Changes` from rule insertions and deletions.
mod _impl_change_identification;
/// **(internal)** Construction and inspection of `ModelManager`.
mod _impl_model_manager;
/// **(internal)** Validation of the partition invariant.
mod _impl_partition_invariant;
/// **(internal)** Application of `Changes` to the equivalence classes.
mod _impl_partition_update;
/// **(internal)** Reporting of `UpdateStatistics`.
mod _impl_update_statistics;

mod error;

pub use error::PartitionInvariantViolation;

/// Maintains the installed rules of a `Network` and the equivalence classes of headers
/// induced by them.
///
/// Invariant: the predicates of the equivalence classes are non-empty, pairwise disjoint
/// and together cover the whole header space.
#[derive(Clone)]
pub struct ModelManager<P: Ports = PersistentPorts> {
    network: Network,
    header_space: HeaderSpace,
    // One index for each device of the network.
    device_to_rules: Vec<TrieRules>,
    // Installed rules, indexed by `RuleId`. Slots of deleted rules are recycled.
    rules: Vec<Option<InstalledRule>>,
    free_rule_ids: Vec<RuleId>,
    rule_to_id: FxHashMap<Rule, RuleId>,
    ports_to_predicate: FxHashMap<P, Predicate>,
    statistics: UpdateStatistics,
}

/// **(internal)** A rule together with its cached match predicate.
#[derive(Clone, Debug)]
struct InstalledRule {
    rule: Rule,
    bdd_match: Predicate,
}

/// Cumulative counters and timers of all batches processed by a `ModelManager`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateStatistics {
    pub batches: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub change_atoms: usize,
    pub deltas: usize,
    pub transferred: usize,
    /// Time spent in `apply_batch`, i.e. updating indices and computing atoms.
    pub change_computation: Duration,
    /// Time spent making the atoms disjoint.
    pub change_aggregation: Duration,
    /// Time spent updating the equivalence classes (including `ports_construction`).
    pub partition_update: Duration,
    /// Time spent constructing new `Ports` objects.
    pub ports_construction: Duration,
}
