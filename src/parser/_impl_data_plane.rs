use crate::parser::{strip_comment, DataPlane, DEVICE_LINE};
use crate::Network;
use std::convert::TryFrom;
use std::fmt::{Display, Error, Formatter};

impl TryFrom<&str> for DataPlane {
    type Error = String;

    /// Device declarations are read first, so rules can refer to devices declared later
    /// in the text.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let mut network = Network::new();
        let mut rule_lines = Vec::new();
        for (index, line) in value.lines().enumerate() {
            let line = strip_comment(line);
            if line.is_empty() {
                continue;
            }
            if let Some(captures) = DEVICE_LINE.captures(line) {
                let device = network
                    .add_device(&captures["name"])
                    .map_err(|error| format!("Line {}: {}", index + 1, error))?;
                for port in captures["ports"].split_whitespace() {
                    network
                        .add_port(device, port)
                        .map_err(|error| format!("Line {}: {}", index + 1, error))?;
                }
            } else {
                rule_lines.push((index, line));
            }
        }

        let mut rules = Vec::with_capacity(rule_lines.len());
        for (index, line) in rule_lines {
            let rule = network
                .parse_rule(line)
                .map_err(|error| format!("Line {}: {}", index + 1, error))?;
            rules.push(rule);
        }
        Ok(DataPlane { network, rules })
    }
}

impl Display for DataPlane {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        for device in self.network.devices() {
            write!(f, "device {}", self.network.get_device_name(device))?;
            for port in self.network.ports(device).filter(|it| !it.is_default()) {
                write!(f, " {}", self.network.get_port_name(port))?;
            }
            writeln!(f)?;
        }
        for rule in &self.rules {
            writeln!(f, "{}", self.network.format_rule(rule))?;
        }
        Ok(())
    }
}
