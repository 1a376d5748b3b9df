use crate::changes::{ChangeAtom, Changes, Delta};
use crate::header_space::Predicate;
use crate::ports::{PortTransition, TransitionTable};
use crate::traits::Set;
use crate::{DeviceId, PortId};
use fxhash::FxHashMap;
use log::{debug, trace, warn};

impl ChangeAtom {
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn transition(&self) -> PortTransition {
        self.transition
    }

    /// The device whose forwarding changes.
    pub fn device(&self) -> DeviceId {
        self.transition.to.device()
    }
}

impl Delta {
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }
}

impl Changes {
    pub fn new() -> Changes {
        Changes::default()
    }

    /// Record that headers in `predicate` are now forwarded to `new_port` instead of
    /// `old_port` (if known). Empty predicates are ignored.
    ///
    /// Panics if the two ports belong to different devices.
    pub fn add(&mut self, predicate: Predicate, old_port: Option<PortId>, new_port: PortId) {
        if let Some(old_port) = old_port {
            assert_eq!(
                old_port.device(),
                new_port.device(),
                "Port transition {} -> {} crosses devices.",
                old_port,
                new_port
            );
        }
        if predicate.is_empty() {
            return;
        }
        trace!(
            "Change atom #{}: {:?} -> {} ({} headers).",
            self.atoms.len(),
            old_port,
            new_port,
            predicate.approx_cardinality()
        );
        self.atoms.push(ChangeAtom {
            predicate,
            transition: PortTransition {
                from: old_port,
                to: new_port,
            },
        });
    }

    /// Atoms which were added since the last aggregation.
    pub fn atoms(&self) -> &[ChangeAtom] {
        &self.atoms
    }

    /// True if there are neither pending atoms nor aggregated deltas.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty() && self.deltas.is_empty()
    }

    /// Fold all pending atoms into the set of disjoint deltas.
    ///
    /// Each atom is intersected with every existing delta; the overlapping part of a delta
    /// receives the transition of the atom, the rest of the delta keeps its transitions
    /// and the part of the atom not covered by any delta becomes a new delta. Afterwards,
    /// deltas with identical transitions are merged.
    ///
    /// The resulting deltas are pairwise disjoint and their union is the union of all
    /// atoms added so far.
    pub fn aggregate(&mut self) {
        if self.atoms.is_empty() {
            return;
        }
        let atom_count = self.atoms.len();
        let mut deltas = std::mem::take(&mut self.deltas);
        for atom in std::mem::take(&mut self.atoms) {
            deltas = fold_atom(deltas, atom);
        }
        self.deltas = merge_equal_transitions(deltas);
        debug!(
            "Aggregated {} change atoms into {} deltas.",
            atom_count,
            self.deltas.len()
        );
    }

    /// The deltas computed by the last call to `aggregate`.
    pub fn all_deltas(&self) -> &[Delta] {
        &self.deltas
    }

    /// Drop all atoms and deltas held by this object.
    pub fn release(&mut self) {
        self.atoms.clear();
        self.deltas.clear();
    }
}

/// **(internal)** Refine the disjoint `deltas` by one atom.
fn fold_atom(deltas: Vec<Delta>, atom: ChangeAtom) -> Vec<Delta> {
    let ChangeAtom {
        predicate,
        transition,
    } = atom;
    let device = transition.to.device();

    let mut remaining = predicate;
    let mut result = Vec::with_capacity(deltas.len() + 1);
    for delta in deltas {
        if remaining.is_empty() {
            result.push(delta);
            continue;
        }
        let intersection = delta.predicate.intersect(&remaining);
        if intersection.is_empty() {
            result.push(delta);
            continue;
        }
        remaining = remaining.minus(&intersection);

        let mut transitions = delta.transitions.clone();
        set_transition(&mut transitions, device, transition);
        let rest = delta.predicate.minus(&intersection);
        if !rest.is_empty() {
            result.push(Delta {
                predicate: rest,
                transitions: delta.transitions,
            });
        }
        result.push(Delta {
            predicate: intersection,
            transitions,
        });
    }

    if !remaining.is_empty() {
        let mut transitions = TransitionTable::new();
        transitions.insert(device, transition);
        result.push(Delta {
            predicate: remaining,
            transitions,
        });
    }
    result
}

/// **(internal)** Set the transition of a device, combining it with an already present one.
///
/// Two transitions of the same device for the same headers must agree on the new port
/// unless there are overlapping rules of equal priority. In such case the later one wins.
fn set_transition(table: &mut TransitionTable, device: DeviceId, transition: PortTransition) {
    match table.get_mut(&device) {
        Some(existing) => {
            if existing.to != transition.to {
                warn!(
                    "Conflicting transitions of {}: {} and {}. Equal rule priorities?",
                    device, existing.to, transition.to
                );
            }
            existing.from = existing.from.or(transition.from);
            existing.to = transition.to;
        }
        None => {
            table.insert(device, transition);
        }
    }
}

/// **(internal)** Merge deltas with identical transition tables, preserving the order in
/// which the tables first appear.
fn merge_equal_transitions(deltas: Vec<Delta>) -> Vec<Delta> {
    let mut index: FxHashMap<TransitionTable, usize> = FxHashMap::default();
    let mut result: Vec<Delta> = Vec::with_capacity(deltas.len());
    for delta in deltas {
        match index.get(&delta.transitions) {
            Some(&i) => {
                result[i].predicate = result[i].predicate.union(&delta.predicate);
            }
            None => {
                index.insert(delta.transitions.clone(), result.len());
                result.push(delta);
            }
        }
    }
    result
}
