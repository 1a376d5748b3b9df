use crate::trie_rules::{RuleId, TrieRules};
use crate::Rule;

/// Methods for modifying the index. The `width` argument is the address width of the
/// header space and must be at least as large as every match length of the rule.
impl TrieRules {
    pub fn new() -> TrieRules {
        TrieRules::default()
    }

    /// Store the rule in the node given by its source suffix and destination prefix,
    /// creating the path if necessary.
    pub fn insert(&mut self, id: RuleId, rule: &Rule, width: u16) {
        let is_new = self.build_path(rule, width).rules.insert(id);
        debug_assert!(is_new, "Rule {:?} is already indexed.", id);
    }

    /// Remove the rule from the node given by its source suffix and destination prefix.
    ///
    /// Returns `false` if the rule was not present there. The index is left untouched
    /// in such case.
    pub fn remove(&mut self, id: RuleId, rule: &Rule, width: u16) -> bool {
        match self.find_path_mut(rule, width) {
            Some(node) => node.rules.remove(&id),
            None => false,
        }
    }

    /// **(internal)** Walk (and build) the source path and then the destination path of
    /// the rule, returning the final destination node.
    fn build_path(&mut self, rule: &Rule, width: u16) -> &mut TrieRules {
        let mut node = self;
        for depth in 0..rule.src_suffix() {
            node = node.build_next(rule.src_bit(depth));
        }
        let mut node: &mut TrieRules = node
            .dst
            .get_or_insert_with(|| Box::new(TrieRules::new()));
        for depth in 0..rule.dst_prefix() {
            node = node.build_next(rule.dst_bit(depth, width));
        }
        node
    }

    /// **(internal)** Same as `build_path`, but gives up when the path does not exist.
    fn find_path_mut(&mut self, rule: &Rule, width: u16) -> Option<&mut TrieRules> {
        let mut node = self;
        for depth in 0..rule.src_suffix() {
            node = node.children[usize::from(rule.src_bit(depth))].as_deref_mut()?;
        }
        let mut node = node.dst.as_deref_mut()?;
        for depth in 0..rule.dst_prefix() {
            node = node.children[usize::from(rule.dst_bit(depth, width))].as_deref_mut()?;
        }
        Some(node)
    }

    fn build_next(&mut self, bit: bool) -> &mut TrieRules {
        self.children[usize::from(bit)].get_or_insert_with(|| Box::new(TrieRules::new()))
    }
}

/// Queries over the index.
impl TrieRules {
    /// Return all rules which may overlap with the given rule, i.e. rules whose source
    /// suffix and destination prefix are compatible with those of `rule`.
    ///
    /// If `rule` itself is indexed, it is part of the result. Every rule appears at most
    /// once.
    pub fn get_all_overlapping_with(&self, rule: &Rule, width: u16) -> Vec<RuleId> {
        let mut result = Vec::new();

        // Rules with a shorter (or equal) source suffix on the path of the rule.
        let mut node = self;
        node.read_dst(rule, width, &mut result);
        for depth in 0..rule.src_suffix() {
            match node.child(rule.src_bit(depth)) {
                Some(next) => {
                    node = next;
                    node.read_dst(rule, width, &mut result);
                }
                None => return result,
            }
        }

        // Rules with a longer source suffix below the path of the rule.
        let mut stack: Vec<&TrieRules> = node.children().collect();
        while let Some(descendant) = stack.pop() {
            descendant.read_dst(rule, width, &mut result);
            stack.extend(descendant.children());
        }

        result
    }

    /// The number of rules stored in this index.
    pub fn len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += node.rules.len();
            stack.extend(node.children());
            stack.extend(node.dst.as_deref());
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// **(internal)** Collect the rules of the destination trie of this source node which
    /// are on the destination path of `rule` or below its end.
    fn read_dst(&self, rule: &Rule, width: u16, result: &mut Vec<RuleId>) {
        let mut node = match self.dst.as_deref() {
            Some(node) => node,
            None => return,
        };
        result.extend(node.rules.iter().cloned());
        for depth in 0..rule.dst_prefix() {
            node = match node.child(rule.dst_bit(depth, width)) {
                Some(next) => next,
                None => return,
            };
            result.extend(node.rules.iter().cloned());
        }

        let mut stack: Vec<&TrieRules> = node.children().collect();
        while let Some(descendant) = stack.pop() {
            result.extend(descendant.rules.iter().cloned());
            stack.extend(descendant.children());
        }
    }

    fn child(&self, bit: bool) -> Option<&TrieRules> {
        self.children[usize::from(bit)].as_deref()
    }

    fn children(&self) -> impl Iterator<Item = &TrieRules> {
        self.children.iter().filter_map(|it| it.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use crate::header_space::HeaderSpace;
    use crate::traits::Set;
    use crate::trie_rules::{RuleId, TrieRules};
    use crate::{DeviceId, PortId, Rule};
    use std::collections::HashSet;

    const WIDTH: u16 = 4;

    /// Build rules for all destination prefixes up to /3 and all source suffixes up to 2
    /// bits. Every other rule also has a (non-indexed) source prefix.
    fn all_rules() -> Vec<Rule> {
        let port = PortId::new(DeviceId::from(0), 1);
        let mut rules = Vec::new();
        for dst_prefix in 0..4u16 {
            for dst_value in 0..(1u64 << dst_prefix) {
                for src_suffix in 0..3u16 {
                    for src_value in 0..(1u64 << src_suffix) {
                        let priority = rules.len() as i32;
                        let dst_match = dst_value << (WIDTH - dst_prefix);
                        let mut rule = Rule::new(dst_match, dst_prefix, priority, port)
                            .with_source_suffix(src_value, src_suffix);
                        if priority % 2 == 1 {
                            rule = rule.with_source_prefix(src_value | 0b1000, 1);
                        }
                        rules.push(rule);
                    }
                }
            }
        }
        rules
    }

    fn build_index(rules: &[Rule]) -> TrieRules {
        let mut index = TrieRules::new();
        for (i, rule) in rules.iter().enumerate() {
            index.insert(RuleId(i), rule, WIDTH);
        }
        index
    }

    #[test]
    fn overlap_soundness() {
        let space = HeaderSpace::new(WIDTH).unwrap();
        let rules = all_rules();
        let index = build_index(&rules);
        assert_eq!(rules.len(), index.len());

        for (i, rule) in rules.iter().enumerate() {
            let candidates = index.get_all_overlapping_with(rule, WIDTH);
            let unique: HashSet<RuleId> = candidates.iter().cloned().collect();
            assert_eq!(unique.len(), candidates.len(), "Duplicate candidates for {}", rule);
            assert!(unique.contains(&RuleId(i)));

            let predicate = space.encode_rule(rule);
            for (j, other) in rules.iter().enumerate() {
                let overlaps = !predicate.intersect(&space.encode_rule(other)).is_empty();
                if overlaps {
                    assert!(
                        unique.contains(&RuleId(j)),
                        "Rule {} overlaps {} but was not found.",
                        other,
                        rule
                    );
                }
            }
        }
    }

    #[test]
    fn overlap_precision() {
        let port = PortId::new(DeviceId::from(0), 1);
        let a = Rule::new(0b1000, 1, 1, port);
        let b = Rule::new(0b0100, 2, 2, port);
        let c = Rule::new(0b1100, 2, 3, port);
        let d = Rule::new(0, 0, 4, port).with_source_suffix(0b1, 1);
        let e = Rule::new(0b1000, 1, 5, port).with_source_suffix(0b0, 1);
        let rules = vec![a.clone(), b.clone(), c.clone(), d.clone(), e.clone()];
        let index = build_index(&rules);

        let found = |rule: &Rule| {
            let mut result = index.get_all_overlapping_with(rule, WIDTH);
            result.sort();
            result
        };

        // `a` is above `c`, `b` is in the other half, `d` has an unconstrained destination
        // and `e` is below `a` in the source trie.
        assert_eq!(vec![RuleId(0), RuleId(2), RuleId(3), RuleId(4)], found(&a));
        assert_eq!(vec![RuleId(1), RuleId(3)], found(&b));
        assert_eq!(vec![RuleId(0), RuleId(2), RuleId(3), RuleId(4)], found(&c));
        // `d` and `e` differ in the lowest source bit.
        assert_eq!(vec![RuleId(0), RuleId(1), RuleId(2), RuleId(3)], found(&d));
        assert_eq!(vec![RuleId(0), RuleId(2), RuleId(4)], found(&e));
    }

    #[test]
    fn insert_and_remove() {
        let rules = all_rules();
        let mut index = build_index(&rules);

        for (i, rule) in rules.iter().enumerate().filter(|(i, _)| i % 3 == 0) {
            assert!(index.remove(RuleId(i), rule, WIDTH));
            assert!(!index.remove(RuleId(i), rule, WIDTH));
        }
        assert_eq!(rules.len() - (rules.len() + 2) / 3, index.len());

        for (i, rule) in rules.iter().enumerate() {
            let candidates = index.get_all_overlapping_with(rule, WIDTH);
            assert_eq!(i % 3 != 0, candidates.contains(&RuleId(i)));
        }

        // Removing from a path that was never built is a no-op.
        let port = PortId::new(DeviceId::from(0), 1);
        let mut empty = TrieRules::new();
        assert!(empty.is_empty());
        assert!(!empty.remove(RuleId(0), &Rule::new(0b1010, 4, 1, port), WIDTH));
        assert!(empty
            .get_all_overlapping_with(&Rule::new(0b1010, 4, 1, port), WIDTH)
            .is_empty());
    }
}
