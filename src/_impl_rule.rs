use crate::{DeviceId, PortId, Rule, DEFAULT_RULE_PRIORITY};
use std::fmt::{Display, Error, Formatter};

impl Rule {
    /// Create a new destination-prefix rule with an unconstrained source.
    ///
    /// The device of the rule is the device of its `out_port`.
    pub fn new(dst_match: u64, dst_prefix: u16, priority: i32, out_port: PortId) -> Rule {
        Rule {
            device: out_port.device(),
            dst_match,
            dst_prefix,
            src_match: 0,
            src_prefix: 0,
            src_suffix: 0,
            priority,
            out_port,
        }
    }

    /// The implicit rule of a device: matches every header, forwards to the default port
    /// and has the lowest possible priority.
    pub fn default_for(device: DeviceId) -> Rule {
        Rule::new(0, 0, DEFAULT_RULE_PRIORITY, PortId::default_of(device))
    }

    /// Constrain the `src_prefix` most significant bits of the source address.
    pub fn with_source_prefix(mut self, src_match: u64, src_prefix: u16) -> Rule {
        self.src_match = src_match;
        self.src_prefix = src_prefix;
        self
    }

    /// Constrain the `src_suffix` least significant bits of the source address.
    ///
    /// These bits are also used by `TrieRules` to index the rule. The bits are taken from
    /// the same source value as the prefix.
    pub fn with_source_suffix(mut self, src_match: u64, src_suffix: u16) -> Rule {
        self.src_match = src_match;
        self.src_suffix = src_suffix;
        self
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn dst_match(&self) -> u64 {
        self.dst_match
    }

    pub fn dst_prefix(&self) -> u16 {
        self.dst_prefix
    }

    pub fn src_match(&self) -> u64 {
        self.src_match
    }

    pub fn src_prefix(&self) -> u16 {
        self.src_prefix
    }

    pub fn src_suffix(&self) -> u16 {
        self.src_suffix
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn out_port(&self) -> PortId {
        self.out_port
    }

    /// Value of the destination bit at `depth` (counting from the most significant bit of
    /// an address of the given `width`).
    pub(crate) fn dst_bit(&self, depth: u16, width: u16) -> bool {
        (self.dst_match >> (width - 1 - depth)) & 1 == 1
    }

    /// Value of the source bit at `depth` (counting from the least significant bit).
    pub(crate) fn src_bit(&self, depth: u16) -> bool {
        (self.src_match >> depth) & 1 == 1
    }
}

impl Display for Rule {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{} {:#x}/{}", self.device, self.dst_match, self.dst_prefix)?;
        if self.src_prefix > 0 || self.src_suffix > 0 {
            write!(
                f,
                " src {:#x}/{}~{}",
                self.src_match, self.src_prefix, self.src_suffix
            )?;
        }
        write!(f, " -> {} @ {}", self.out_port, self.priority)
    }
}

#[cfg(test)]
mod tests {
    use crate::{DeviceId, PortId, Rule, DEFAULT_RULE_PRIORITY};

    #[test]
    fn rule_bits() {
        let port = PortId::new(DeviceId::from(1), 1);
        let rule = Rule::new(0b1010_0000, 3, 5, port).with_source_suffix(0b0110, 4);
        assert_eq!(DeviceId::from(1), rule.device());
        assert!(rule.dst_bit(0, 8));
        assert!(!rule.dst_bit(1, 8));
        assert!(rule.dst_bit(2, 8));
        assert!(!rule.src_bit(0));
        assert!(rule.src_bit(1));
        assert!(rule.src_bit(2));
        assert!(!rule.src_bit(3));
        assert_eq!(4, rule.src_suffix());
        assert_eq!(0, rule.src_prefix());
    }

    #[test]
    fn rule_identity() {
        let port = PortId::new(DeviceId::from(0), 2);
        let a = Rule::new(10 << 24, 8, 10, port);
        let b = Rule::new(10 << 24, 8, 10, port);
        let c = Rule::new(10 << 24, 8, 11, port);
        assert_eq!(a, b);
        assert_ne!(a, c);

        let default = Rule::default_for(DeviceId::from(0));
        assert_eq!(DEFAULT_RULE_PRIORITY, default.priority());
        assert!(default.out_port().is_default());
        assert_eq!(0, default.dst_prefix());
    }
}
