//! Forwarding behaviour descriptors: the assignment of an output port to every device.
//!
//! Every equivalence class is identified by its `Ports` object. Since a network can have
//! many devices and most updates only change a handful of them, the default implementation
//! (`PersistentPorts`) shares unchanged parts of the assignment between objects. A simple
//! flat implementation (`ArrayPorts`) is also provided.

use crate::{DeviceId, PortId};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

/// **(internal)** Implementation of `ArrayPorts`.
mod _impl_array_ports;
/// **(internal)** Implementation of `PersistentPorts`.
mod _impl_persistent_ports;

/// The change of output port of one device.
///
/// `from` is `None` when the change was caused by a newly inserted rule (the previous port
/// of the region is not tracked in that case).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PortTransition {
    pub from: Option<PortId>,
    pub to: PortId,
}

/// A set of port transitions, at most one for each device.
pub type TransitionTable = BTreeMap<DeviceId, PortTransition>;

/// An immutable assignment of one port to every device of a continuous range of devices.
///
/// Implementations are compared and hashed by content, since they are used as keys of
/// the equivalence class map.
pub trait Ports: Clone + Eq + Hash + Debug {
    /// Build an assignment of the devices `offset..(offset + length)`, where the port of
    /// device `i` is `ordered_ports[i]`.
    fn create(ordered_ports: &[PortId], offset: usize, length: usize) -> Self;

    /// Make a copy of this assignment where every device mentioned in `changes` uses
    /// the `to` port of its transition.
    fn create_with_changes(&self, changes: &TransitionTable) -> Self;

    /// The port assigned to the given device.
    fn get(&self, device: DeviceId) -> PortId;

    /// All assigned ports, ordered by device.
    fn all_ports(&self) -> Vec<PortId>;

    /// The number of devices covered by this assignment.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A flat `Vec` based assignment. Every change copies the whole vector.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ArrayPorts {
    offset: usize,
    ports: Vec<PortId>,
}

/// A persistent balanced tree based assignment.
///
/// Unchanged sub-trees are shared between the original and the updated assignment, so
/// `create_with_changes` only allocates `O(k * log(n))` nodes for `k` changed devices.
/// Every node caches the hash of its sub-tree which makes hashing `O(1)` and lets most
/// unequal assignments be distinguished without a traversal.
///
/// The structure uses `Rc` and is therefore not thread safe.
#[derive(Clone, Debug)]
pub struct PersistentPorts {
    offset: usize,
    // `None` for an assignment of zero devices.
    root: Option<Rc<PortsNode>>,
}

/// **(internal)** One node of `PersistentPorts`.
#[derive(Debug)]
enum PortsNode {
    Leaf(PortId),
    Branch {
        length: usize,
        hash: u64,
        left: Rc<PortsNode>,
        right: Rc<PortsNode>,
    },
}
