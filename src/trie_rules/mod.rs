//! A per-device index of forwarding rules which quickly finds rules that can overlap
//! with a given rule.
//!
//! The index is a binary trie over the low-order bits of the source address (up to the
//! source suffix length of each rule). Every node of this *source* trie carries a nested
//! *destination* trie over the high-order bits of the destination address (up to the
//! destination prefix length). A rule is stored in the destination trie node reached by
//! walking first its source bits and then its destination bits.
//!
//! Two rules can only overlap if one source path is a prefix of the other and one
//! destination path is a prefix of the other. The index ignores every other bit of the
//! match (e.g. the source prefix), hence the overlap query returns a superset of the truly
//! overlapping rules and the result has to be confirmed on the predicates.

use fxhash::FxHashSet;

/// **(internal)** Implementation of insertion, removal and overlap queries.
mod _impl_trie_rules;

/// A type-safe identifier of a rule stored in a `TrieRules` index.
///
/// The index itself does not know anything about the rule objects, it only stores their
/// identifiers. Resolving the identifier is up to the owner of the index.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RuleId(pub(crate) usize);

/// One node of the rule index.
///
/// The same structure is used for the source trie and for the destination tries, only
/// source nodes use the `dst` sub-trie and only destination nodes store rules.
#[derive(Clone, Debug, Default)]
pub struct TrieRules {
    rules: FxHashSet<RuleId>,
    children: [Option<Box<TrieRules>>; 2],
    dst: Option<Box<TrieRules>>,
}
