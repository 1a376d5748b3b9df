//! Incremental maintenance of network-wide packet equivalence classes.
//!
//! The crate keeps a partition of the packet header space into *equivalence classes* (ECs):
//! maximal sets of headers that are forwarded identically by every device of a `Network`.
//! The partition is updated incrementally as forwarding `Rule`s are inserted and removed,
//! using a two stage algorithm:
//!
//!  1. *Change identification*: for every edited rule, a per-device bit-trie (`TrieRules`)
//!     narrows down the rules it can overlap with, and BDD operations compute the exact
//!     header region whose forwarding changes. The resulting atoms are collected
//!     in `Changes` and made pairwise disjoint.
//!  2. *Partition update*: every disjoint delta is folded into the map from forwarding
//!     behaviour (`Ports`) to the header predicate of the corresponding EC.
//!
//! Header predicates are represented as `Predicate` objects backed by `biodivine-lib-bdd`,
//! created through a `HeaderSpace`. The entry point is the `ModelManager`.

use std::collections::HashMap;
use std::iter::Map;
use std::ops::Range;

pub mod changes;
pub mod header_space;
pub mod model_manager;
pub mod parser;
pub mod ports;
pub mod traits;
pub mod trie_rules;

/// **(internal)** Utility methods for `DeviceId` and `PortId`.
mod _impl_ids;
/// **(internal)** Construction and inspection of `Network` objects.
mod _impl_network;
/// **(internal)** Utility methods for `Rule`.
mod _impl_rule;

pub use changes::{ChangeAtom, Changes, Delta};
pub use header_space::{HeaderSpace, Predicate};
pub use model_manager::{ModelManager, PartitionInvariantViolation, UpdateStatistics};
pub use parser::{DataPlane, UpdateBatch};
pub use ports::{ArrayPorts, PersistentPorts, PortTransition, Ports, TransitionTable};
pub use trie_rules::TrieRules;

/// Name of the port which is automatically created for every device and which is used by
/// the implicit default rule of that device.
pub const DEFAULT_PORT_NAME: &str = "default";

/// Priority of the implicit match-everything rule installed on every device. It is strictly
/// lower than the priority of any rule with a non-negative priority.
pub const DEFAULT_RULE_PRIORITY: i32 = -1;

/// A type-safe index of a `Device` inside a `Network`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DeviceId(usize);

/// A type-safe index of a port inside a `Network`.
///
/// A port always belongs to exactly one device, which is stored as part of the id. The port
/// with local index `0` is the default port of the device.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PortId {
    device: DeviceId,
    index: usize,
}

/// A forwarding device of a `Network` with a list of named ports.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Device {
    name: String,
    ports: Vec<String>,
}

/// A collection of devices and their ports.
///
/// The network does not store any topology, only the identities which are needed to
/// describe forwarding behaviour: devices (indexed by `DeviceId`) and their ports
/// (indexed by `PortId`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Network {
    devices: Vec<Device>,
    device_to_index: HashMap<String, DeviceId>,
}

/// One forwarding entry installed at one device.
///
/// The match is given by a destination prefix, a source prefix (high-order bits) and
/// a source suffix (low-order bits). Only the destination prefix and the source suffix
/// are used by the `TrieRules` index, but all three are part of the encoded predicate.
///
/// Rules are plain values: two rules with the same fields are the same rule.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Rule {
    device: DeviceId,
    dst_match: u64,
    dst_prefix: u16,
    src_match: u64,
    src_prefix: u16,
    src_suffix: u16,
    priority: i32,
    out_port: PortId,
}

/// An iterator over all `DeviceId`s of a `Network`.
pub type DeviceIdIterator = Map<Range<usize>, fn(usize) -> DeviceId>;
