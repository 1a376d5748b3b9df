//! A simple line-based text format for data planes and rule update scripts.
//!
//! A data plane declares devices (with their ports) and rules:
//!
//! ```text
//! # devices
//! device s1 p1 p2
//! device s2
//! # rules: <device> <dst>/<len> [src <src>/<len>] [suffix <n>] -> <port> @ <priority>
//! s1 10.0.0.0/8 -> p1 @ 10
//! s1 10.1.0.0/16 src 0x0a000001/32 -> p2 @ 20
//! ```
//!
//! Addresses are dotted IPv4 quads or unsigned integers (decimal or `0x` hexadecimal).
//! The port `default` exists on every device.
//!
//! An update script contains rule lines prefixed with `+` (insert) or `-` (delete).
//! Batches are separated by blank lines.

use crate::{Network, Rule};
use lazy_static::lazy_static;
use regex::Regex;

/// **(internal)** Parsing of `DataPlane` descriptions.
mod _impl_data_plane;
/// **(internal)** Parsing and formatting of rules and update scripts.
mod _impl_rule_format;

lazy_static! {
    /// Matches a device declaration with an optional list of port names.
    static ref DEVICE_LINE: Regex = Regex::new(
        r"^device\s+(?P<name>[a-zA-Z0-9_.:\-]+)(?P<ports>(\s+[a-zA-Z0-9_.:\-]+)*)$"
    ).unwrap();

    /// Matches one rule.
    static ref RULE_LINE: Regex = Regex::new(concat!(
        r"^(?P<device>[a-zA-Z0-9_.:\-]+)\s+(?P<dst>[0-9a-fA-Fx.]+)/(?P<dst_len>[0-9]+)",
        r"(\s+src\s+(?P<src>[0-9a-fA-Fx.]+)/(?P<src_len>[0-9]+))?",
        r"(\s+suffix\s+(?P<suffix>[0-9]+))?",
        r"\s*->\s*(?P<port>[a-zA-Z0-9_.:\-]+)\s*@\s*(?P<priority>-?[0-9]+)$"
    )).unwrap();

    /// Matches a dotted IPv4 address.
    static ref IPV4: Regex = Regex::new(
        r"^(?P<a>[0-9]{1,3})\.(?P<b>[0-9]{1,3})\.(?P<c>[0-9]{1,3})\.(?P<d>[0-9]{1,3})$"
    ).unwrap();
}

/// A `Network` together with the rules installed in it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataPlane {
    network: Network,
    rules: Vec<Rule>,
}

/// One batch of an update script.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpdateBatch {
    insertions: Vec<Rule>,
    deletions: Vec<Rule>,
}

impl DataPlane {
    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn into_parts(self) -> (Network, Vec<Rule>) {
        (self.network, self.rules)
    }
}

impl UpdateBatch {
    pub fn new(insertions: Vec<Rule>, deletions: Vec<Rule>) -> UpdateBatch {
        UpdateBatch {
            insertions,
            deletions,
        }
    }

    pub fn insertions(&self) -> &[Rule] {
        &self.insertions
    }

    pub fn deletions(&self) -> &[Rule] {
        &self.deletions
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.deletions.is_empty()
    }
}

/// **(internal)** Remove the comment and surrounding whitespace from a line.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(index) => line[..index].trim(),
        None => line.trim(),
    }
}

/// Parse an address given either as a dotted IPv4 quad or as an unsigned integer.
pub fn parse_address(value: &str) -> Result<u64, String> {
    if let Some(captures) = IPV4.captures(value) {
        let mut address = 0u64;
        for part in ["a", "b", "c", "d"] {
            let byte: u64 = captures[part]
                .parse()
                .map_err(|_| format!("Invalid address `{}`.", value))?;
            if byte > 255 {
                return Err(format!("Invalid address `{}`.", value));
            }
            address = (address << 8) | byte;
        }
        return Ok(address);
    }
    let parsed = if let Some(hex) = value.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        value.parse::<u64>()
    };
    parsed.map_err(|_| format!("Invalid address `{}`.", value))
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_address;

    #[test]
    fn addresses() {
        assert_eq!(Ok(10 << 24), parse_address("10.0.0.0"));
        assert_eq!(Ok(0xc0a80101), parse_address("192.168.1.1"));
        assert_eq!(Ok(42), parse_address("42"));
        assert_eq!(Ok(0xff), parse_address("0xff"));
        assert!(parse_address("256.0.0.1").is_err());
        assert!(parse_address("1.2.3").is_err());
        assert!(parse_address("0xg").is_err());
        assert!(parse_address("").is_err());
    }
}
