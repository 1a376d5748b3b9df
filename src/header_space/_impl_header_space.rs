use crate::header_space::{HeaderSpace, Predicate, MAX_ADDRESS_WIDTH};
use crate::Rule;
use biodivine_lib_bdd::{BddPartialValuation, BddVariableSet, BddVariableSetBuilder};

impl HeaderSpace {
    /// Create a new `HeaderSpace` for addresses of the given bit width.
    ///
    /// The width must be between `1` and `64`.
    pub fn new(address_width: u16) -> Result<HeaderSpace, String> {
        if address_width == 0 || address_width > MAX_ADDRESS_WIDTH {
            return Err(format!(
                "Invalid address width {}. Supported widths are 1 to {}.",
                address_width, MAX_ADDRESS_WIDTH
            ));
        }

        let mut builder = BddVariableSetBuilder::new();
        let dst_variables = (0..address_width)
            .rev()
            .map(|bit| builder.make_variable(&format!("dst_{}", bit)))
            .collect();
        let src_variables = (0..address_width)
            .rev()
            .map(|bit| builder.make_variable(&format!("src_{}", bit)))
            .collect();

        Ok(HeaderSpace {
            bdd: builder.build(),
            address_width,
            dst_variables,
            src_variables,
        })
    }

    /// Header space of IPv4 addresses.
    pub fn ipv4() -> HeaderSpace {
        HeaderSpace::new(32).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Provides access to the raw `Bdd` context.
    pub fn bdd_variable_set(&self) -> &BddVariableSet {
        &self.bdd
    }

    pub fn address_width(&self) -> u16 {
        self.address_width
    }

    /// The predicate containing every header.
    pub fn mk_everything(&self) -> Predicate {
        Predicate::new(self.bdd.mk_true())
    }

    /// The predicate containing no header.
    pub fn mk_nothing(&self) -> Predicate {
        Predicate::new(self.bdd.mk_false())
    }

    /// Encode the headers matching a destination prefix and a source prefix.
    ///
    /// Only the `dst_prefix` (`src_prefix`) most significant bits of the match values are
    /// relevant. Panics if a prefix is longer than the address width.
    pub fn encode(
        &self,
        dst_match: u64,
        dst_prefix: u16,
        src_match: u64,
        src_prefix: u16,
    ) -> Predicate {
        self.encode_match(dst_match, dst_prefix, src_match, src_prefix, 0)
    }

    /// Encode the headers matched by the given rule, including its source suffix.
    pub fn encode_rule(&self, rule: &Rule) -> Predicate {
        self.encode_match(
            rule.dst_match(),
            rule.dst_prefix(),
            rule.src_match(),
            rule.src_prefix(),
            rule.src_suffix(),
        )
    }

    /// Encode a single header, i.e. a predicate with exactly one element.
    pub fn encode_header(&self, dst: u64, src: u64) -> Predicate {
        let width = self.address_width;
        self.encode_match(dst, width, src, width, 0)
    }

    /// Check that all match lengths and match values of the rule fit into this header space.
    pub fn check_rule(&self, rule: &Rule) -> Result<(), String> {
        let width = self.address_width;
        let fits = |value: u64| width >= MAX_ADDRESS_WIDTH || value >> width == 0;
        if !fits(rule.dst_match()) {
            return Err(format!(
                "Destination address {:#x} of rule `{}` exceeds address width {}.",
                rule.dst_match(),
                rule,
                width
            ));
        }
        if !fits(rule.src_match()) {
            return Err(format!(
                "Source address {:#x} of rule `{}` exceeds address width {}.",
                rule.src_match(),
                rule,
                width
            ));
        }
        if rule.dst_prefix() > width {
            return Err(format!(
                "Destination prefix /{} of rule `{}` exceeds address width {}.",
                rule.dst_prefix(),
                rule,
                width
            ));
        }
        if rule.src_prefix() > width {
            return Err(format!(
                "Source prefix /{} of rule `{}` exceeds address width {}.",
                rule.src_prefix(),
                rule,
                width
            ));
        }
        if rule.src_suffix() > width {
            return Err(format!(
                "Source suffix {} of rule `{}` exceeds address width {}.",
                rule.src_suffix(),
                rule,
                width
            ));
        }
        Ok(())
    }

    /// **(internal)** Build the conjunctive clause fixing the relevant address bits.
    fn encode_match(
        &self,
        dst_match: u64,
        dst_prefix: u16,
        src_match: u64,
        src_prefix: u16,
        src_suffix: u16,
    ) -> Predicate {
        let width = self.address_width;
        assert!(
            dst_prefix <= width && src_prefix <= width && src_suffix <= width,
            "Match lengths /{}, /{}, ~{} exceed address width {}.",
            dst_prefix,
            src_prefix,
            src_suffix,
            width
        );

        let bit = |value: u64, position: u16| (value >> position) & 1 == 1;

        let mut clause = BddPartialValuation::empty();
        for depth in 0..dst_prefix {
            let position = width - 1 - depth;
            clause.set_value(self.dst_variables[usize::from(depth)], bit(dst_match, position));
        }
        for depth in 0..src_prefix {
            let position = width - 1 - depth;
            clause.set_value(self.src_variables[usize::from(depth)], bit(src_match, position));
        }
        for position in 0..src_suffix {
            let variable = self.src_variables[usize::from(width - 1 - position)];
            clause.set_value(variable, bit(src_match, position));
        }

        Predicate::new(self.bdd.mk_conjunctive_clause(&clause))
    }
}

#[cfg(test)]
mod tests {
    use crate::header_space::HeaderSpace;
    use crate::traits::Set;
    use crate::{DeviceId, PortId, Rule};

    #[test]
    fn header_space_width() {
        assert!(HeaderSpace::new(0).is_err());
        assert!(HeaderSpace::new(65).is_err());
        let space = HeaderSpace::new(64).unwrap();
        assert_eq!(128, space.bdd_variable_set().num_vars());
        assert_eq!(32, HeaderSpace::ipv4().address_width());
    }

    #[test]
    fn encode_prefixes() {
        let space = HeaderSpace::new(8).unwrap();
        let everything = space.mk_everything();
        assert!(everything.is_everything());
        assert!(space.mk_nothing().is_empty());
        assert_eq!(65536.0, everything.approx_cardinality());

        // An empty prefix matches everything.
        assert_eq!(everything, space.encode(0xAB, 0, 0xCD, 0));

        let a = space.encode(0b1000_0000, 1, 0, 0);
        let b = space.encode(0b1100_0000, 2, 0, 0);
        let c = space.encode(0b0100_0000, 2, 0, 0);
        assert_eq!(32768.0, a.approx_cardinality());
        assert!(b.is_subset(&a));
        assert!(a.intersect(&c).is_empty());
        assert_eq!(a.minus(&b), space.encode(0b1000_0000, 2, 0, 0));

        let src = space.encode(0, 0, 0b1010_0000, 4);
        assert_eq!(4096.0, src.approx_cardinality());
        assert!(!src.intersect(&b).is_empty());
    }

    #[test]
    fn encode_rule_with_suffix() {
        let space = HeaderSpace::new(8).unwrap();
        let port = PortId::new(DeviceId::from(0), 1);
        let rule = Rule::new(0b1000_0000, 1, 1, port).with_source_suffix(0b0000_0011, 2);
        let predicate = space.encode_rule(&rule);
        assert_eq!(8192.0, predicate.approx_cardinality());
        assert!(!predicate.intersect(&space.encode_header(0b1111_0000, 0b0101_0111)).is_empty());
        assert!(predicate.intersect(&space.encode_header(0b1111_0000, 0b0101_0110)).is_empty());
        assert!(predicate.intersect(&space.encode_header(0b0111_0000, 0b0101_0111)).is_empty());
    }

    #[test]
    fn check_rule_lengths() {
        let space = HeaderSpace::new(8).unwrap();
        let port = PortId::new(DeviceId::from(0), 1);
        assert!(space.check_rule(&Rule::new(0, 8, 1, port)).is_ok());
        assert!(space.check_rule(&Rule::new(0, 9, 1, port)).is_err());
        assert!(space
            .check_rule(&Rule::new(0, 8, 1, port).with_source_prefix(0, 9))
            .is_err());
        assert!(space
            .check_rule(&Rule::new(0, 8, 1, port).with_source_suffix(0, 9))
            .is_err());

        // Match values must fit into the address width as well.
        assert!(space.check_rule(&Rule::new(0xff, 8, 1, port)).is_ok());
        assert!(space.check_rule(&Rule::new(0x100, 8, 1, port)).is_err());
        assert!(space.check_rule(&Rule::new(10 << 24, 8, 1, port)).is_err());
        assert!(space
            .check_rule(&Rule::new(0, 8, 1, port).with_source_prefix(0x1ff, 1))
            .is_err());
        let wide = HeaderSpace::new(64).unwrap();
        assert!(wide.check_rule(&Rule::new(u64::MAX, 64, 1, port)).is_ok());
    }

    #[test]
    #[should_panic]
    fn encode_too_long_prefix() {
        HeaderSpace::new(8).unwrap().encode(0, 9, 0, 0);
    }
}
