//! Collection and aggregation of forwarding changes computed for one batch of rule updates.
//!
//! Change identification produces *atoms*: a header predicate together with the port
//! transition of one device. Atoms of different rules (and different devices) can overlap.
//! Before the atoms can be applied to the equivalence classes, they are aggregated into
//! pairwise disjoint *deltas*, each carrying the transitions of all devices whose atoms
//! cover it.

use crate::header_space::Predicate;
use crate::ports::{PortTransition, TransitionTable};

/// **(internal)** Implementation of `Changes`.
mod _impl_changes;

/// A single change computed for one rule: headers in `predicate` are now forwarded by
/// the device of the transition according to `transition`.
#[derive(Clone, Debug)]
pub struct ChangeAtom {
    predicate: Predicate,
    transition: PortTransition,
}

/// A header region with the port transitions of all devices that change forwarding for
/// headers in the region.
#[derive(Clone, Debug)]
pub struct Delta {
    predicate: Predicate,
    transitions: TransitionTable,
}

/// Changes of one batch of rule updates.
///
/// All predicates of the atoms and deltas are owned by this object. They are released
/// when the object is dropped or by an explicit call to `release`.
#[derive(Clone, Debug, Default)]
pub struct Changes {
    atoms: Vec<ChangeAtom>,
    deltas: Vec<Delta>,
}
