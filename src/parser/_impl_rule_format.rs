use crate::parser::{parse_address, strip_comment, UpdateBatch, RULE_LINE};
use crate::{Network, Rule};

/// Methods for reading and writing rules in the text format (see `parser` module).
impl Network {
    /// Parse a single rule line, resolving device and port names against this network.
    pub fn parse_rule(&self, line: &str) -> Result<Rule, String> {
        let line = line.trim();
        let captures = RULE_LINE
            .captures(line)
            .ok_or_else(|| format!("Invalid rule `{}`.", line))?;

        let device = self
            .find_device(&captures["device"])
            .ok_or_else(|| format!("Unknown device `{}` in rule `{}`.", &captures["device"], line))?;
        let port = self.find_port(device, &captures["port"]).ok_or_else(|| {
            format!(
                "Unknown port `{}` of device `{}` in rule `{}`.",
                &captures["port"], &captures["device"], line
            )
        })?;
        let priority: i32 = captures["priority"]
            .parse()
            .map_err(|_| format!("Invalid priority in rule `{}`.", line))?;

        let dst = parse_address(&captures["dst"])?;
        let dst_prefix = parse_length(&captures["dst_len"], line)?;
        let mut rule = Rule::new(dst, dst_prefix, priority, port);

        let src = match captures.name("src") {
            Some(src) => parse_address(src.as_str())?,
            None => 0,
        };
        if let Some(length) = captures.name("src_len") {
            rule = rule.with_source_prefix(src, parse_length(length.as_str(), line)?);
        }
        if let Some(length) = captures.name("suffix") {
            rule = rule.with_source_suffix(src, parse_length(length.as_str(), line)?);
        }
        Ok(rule)
    }

    /// Write the rule as a line which `parse_rule` accepts.
    pub fn format_rule(&self, rule: &Rule) -> String {
        let mut line = format!(
            "{} {:#x}/{}",
            self.get_device_name(rule.device()),
            rule.dst_match(),
            rule.dst_prefix()
        );
        if rule.src_prefix() > 0 || rule.src_match() != 0 {
            line.push_str(&format!(" src {:#x}/{}", rule.src_match(), rule.src_prefix()));
        }
        if rule.src_suffix() > 0 {
            line.push_str(&format!(" suffix {}", rule.src_suffix()));
        }
        line.push_str(&format!(
            " -> {} @ {}",
            self.get_port_name(rule.out_port()),
            rule.priority()
        ));
        line
    }

    /// Parse an update script into batches of insertions and deletions.
    ///
    /// Every rule line is prefixed by `+` (insert) or `-` (delete). Batches are separated
    /// by blank lines; empty batches are skipped.
    pub fn parse_update_script(&self, script: &str) -> Result<Vec<UpdateBatch>, String> {
        let mut batches = Vec::new();
        let mut batch = UpdateBatch::default();
        for (index, line) in script.lines().enumerate() {
            if line.trim().is_empty() {
                if !batch.is_empty() {
                    batches.push(std::mem::take(&mut batch));
                }
                continue;
            }
            let line = strip_comment(line);
            if line.is_empty() {
                continue;
            }

            let (target, rule) = if let Some(rule) = line.strip_prefix('+') {
                (&mut batch.insertions, rule)
            } else if let Some(rule) = line.strip_prefix('-') {
                (&mut batch.deletions, rule)
            } else {
                return Err(format!(
                    "Line {}: expected `+` or `-` before rule `{}`.",
                    index + 1,
                    line
                ));
            };
            let rule = self
                .parse_rule(rule)
                .map_err(|error| format!("Line {}: {}", index + 1, error))?;
            target.push(rule);
        }
        if !batch.is_empty() {
            batches.push(batch);
        }
        Ok(batches)
    }
}

fn parse_length(value: &str, line: &str) -> Result<u16, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid match length `{}` in rule `{}`.", value, line))
}

#[cfg(test)]
mod tests {
    use crate::{Network, PortId, Rule};
    use pretty_assertions::assert_eq;

    fn network() -> Network {
        let mut network = Network::from_device_names(&["s1", "s2"]).unwrap();
        let s1 = network.find_device("s1").unwrap();
        network.add_port(s1, "p1").unwrap();
        network
    }

    #[test]
    fn parse_rules() {
        let network = network();
        let s1 = network.find_device("s1").unwrap();
        let p1 = network.find_port(s1, "p1").unwrap();

        assert_eq!(
            Ok(Rule::new(10 << 24, 8, 10, p1)),
            network.parse_rule("s1 10.0.0.0/8 -> p1 @ 10")
        );
        assert_eq!(
            Ok(Rule::new(0, 0, -5, PortId::default_of(s1)).with_source_prefix(0xff, 24)),
            network.parse_rule("  s1 0/0 src 0xff/24 -> default @ -5 ")
        );
        assert_eq!(
            Ok(Rule::new(1, 32, 3, p1)
                .with_source_prefix(6, 1)
                .with_source_suffix(6, 2)),
            network.parse_rule("s1 1/32 src 6/1 suffix 2->p1@3")
        );
        assert_eq!(
            Ok(Rule::new(1, 32, 3, p1).with_source_suffix(0, 2)),
            network.parse_rule("s1 1/32 suffix 2 -> p1 @ 3")
        );

        assert!(network.parse_rule("s1 10.0.0.0 -> p1 @ 10").is_err());
        assert!(network.parse_rule("s3 10.0.0.0/8 -> p1 @ 10").is_err());
        assert!(network.parse_rule("s2 10.0.0.0/8 -> p1 @ 10").is_err());
        assert!(network.parse_rule("s1 10.0.0.300/8 -> p1 @ 10").is_err());
        assert!(network.parse_rule("s1 10.0.0.0/8 -> p1 @ 99999999999").is_err());
    }

    #[test]
    fn format_rules() {
        let network = network();
        let s1 = network.find_device("s1").unwrap();
        let p1 = network.find_port(s1, "p1").unwrap();
        let rules = vec![
            Rule::new(10 << 24, 8, 10, p1),
            Rule::default_for(s1),
            Rule::new(7, 4, 1, p1).with_source_prefix(9, 0),
            Rule::new(7, 4, 1, p1)
                .with_source_prefix(0xf0, 4)
                .with_source_suffix(0xf3, 2),
        ];
        assert_eq!("s1 0xa000000/8 -> p1 @ 10", network.format_rule(&rules[0]));
        for rule in rules {
            assert_eq!(Ok(rule.clone()), network.parse_rule(&network.format_rule(&rule)));
        }
    }

    #[test]
    fn parse_update_scripts() {
        let network = network();
        let script = "
            # first batch
            + s1 10.0.0.0/8 -> p1 @ 10
            + s2 10.0.0.0/8 -> default @ 10

            - s1 10.0.0.0/8 -> p1 @ 10  # revert
            # comments do not split batches

            + s1 11.0.0.0/8 -> p1 @ 10



        ";
        let batches = network.parse_update_script(script).unwrap();
        assert_eq!(3, batches.len());
        assert_eq!(2, batches[0].insertions().len());
        assert!(batches[0].deletions().is_empty());
        assert_eq!(1, batches[1].deletions().len());
        assert_eq!(batches[0].insertions()[0], batches[1].deletions()[0]);
        assert_eq!(1, batches[2].insertions().len());

        let error = network
            .parse_update_script("+ s1 1/8 -> p1 @ 1\ns1 1/8 -> p1 @ 1")
            .unwrap_err();
        assert!(error.starts_with("Line 2"));
        assert!(network.parse_update_script("+ s1 1/8 -> p9 @ 1").is_err());
        assert_eq!(Ok(vec![]), network.parse_update_script("\n# nothing\n"));
    }
}
