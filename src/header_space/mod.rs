//! Symbolic representation of sets of packet headers.
//!
//! A header consists of a destination and a source address of the same bit width. Every
//! address bit is one BDD variable. The variables are ordered destination first, most
//! significant bit first, since prefix matches on the destination dominate typical
//! forwarding tables and this ordering keeps such predicates linear in size.

use biodivine_lib_bdd::{Bdd, BddVariable, BddVariableSet};

/// **(internal)** Implementation of the `HeaderSpace` encoding.
mod _impl_header_space;
/// **(internal)** Implementation of set operations for `Predicate`.
mod _impl_predicate;

/// Maximal supported width of a single address (addresses are stored as `u64`).
pub const MAX_ADDRESS_WIDTH: u16 = 64;

/// Header space manages the mapping between address bits and the `BddVariables` used
/// in `biodivine-lib-bdd`.
///
/// It provides the constant predicates and the encoding of rule matches.
#[derive(Clone)]
pub struct HeaderSpace {
    bdd: BddVariableSet,
    address_width: u16,
    // Destination address bits, most significant first.
    dst_variables: Vec<BddVariable>,
    // Source address bits, most significant first.
    src_variables: Vec<BddVariable>,
}

/// A set of packet headers, i.e. a Boolean function over the header bits of
/// some `HeaderSpace`.
///
/// The predicate owns its `Bdd`. Cloning it creates an independent copy and dropping it
/// releases all memory, so predicates can be freely stored in maps and returned to callers.
///
/// Equality is semantic: two predicates are equal when they contain the same headers.
#[derive(Clone, Debug)]
pub struct Predicate {
    bdd: Bdd,
}
