use crate::header_space::{HeaderSpace, Predicate};
use crate::model_manager::{InstalledRule, ModelManager, UpdateStatistics};
use crate::ports::{PersistentPorts, Ports};
use crate::traits::Set;
use crate::trie_rules::{RuleId, TrieRules};
use crate::{Network, PortId, Rule};
use fxhash::FxHashMap;
use log::debug;

impl ModelManager<PersistentPorts> {
    /// Create a new `ModelManager` for the given network, using IPv4 sized addresses.
    ///
    /// Every device starts with a default rule, hence the model initially has one
    /// equivalence class which forwards everything to the default ports.
    pub fn new(network: Network) -> ModelManager<PersistentPorts> {
        ModelManager::with_header_space(network, HeaderSpace::ipv4())
    }
}

/// Methods for safely constructing new instances of `ModelManager`.
impl<P: Ports> ModelManager<P> {
    /// Create a new `ModelManager` with the given address width.
    ///
    /// Returns `Err` if the width is not supported by `HeaderSpace`.
    pub fn with_address_width(
        network: Network,
        address_width: u16,
    ) -> Result<ModelManager<P>, String> {
        Ok(ModelManager::with_header_space(
            network,
            HeaderSpace::new(address_width)?,
        ))
    }

    /// Create a new `ModelManager` that uses an existing `HeaderSpace`.
    pub fn with_header_space(network: Network, header_space: HeaderSpace) -> ModelManager<P> {
        let everything = header_space.mk_everything();
        let default_ports = network.default_ports();
        let devices: Vec<_> = network.devices().collect();

        let mut manager = ModelManager {
            device_to_rules: vec![TrieRules::new(); devices.len()],
            rules: Vec::new(),
            free_rule_ids: Vec::new(),
            rule_to_id: FxHashMap::default(),
            ports_to_predicate: FxHashMap::default(),
            statistics: UpdateStatistics::default(),
            network,
            header_space,
        };

        for device in devices {
            manager.install_with_match(Rule::default_for(device), everything.clone());
        }

        let ports = P::create(&default_ports, 0, default_ports.len());
        manager.ports_to_predicate.insert(ports, everything);
        debug!(
            "Created model of {} devices with {}-bit addresses.",
            default_ports.len(),
            manager.header_space.address_width()
        );
        manager
    }
}

/// Some basic utility methods for inspecting the `ModelManager`.
impl<P: Ports> ModelManager<P> {
    /// The network whose data plane is modelled.
    pub fn as_network(&self) -> &Network {
        &self.network
    }

    /// The header space used to encode all predicates of this model.
    pub fn header_space(&self) -> &HeaderSpace {
        &self.header_space
    }

    /// The number of installed rules, including the default rule of every device.
    pub fn num_rules(&self) -> usize {
        self.rule_to_id.len()
    }

    /// True if the given rule is installed.
    pub fn contains_rule(&self, rule: &Rule) -> bool {
        self.rule_to_id.contains_key(rule)
    }

    /// Cumulative statistics of all processed batches.
    pub fn statistics(&self) -> &UpdateStatistics {
        &self.statistics
    }

    /// The current equivalence classes: forwarding behaviour mapped to the predicate of
    /// headers with that behaviour.
    pub fn current_partition(&self) -> &FxHashMap<P, Predicate> {
        &self.ports_to_predicate
    }

    /// The number of equivalence classes.
    pub fn partition_size(&self) -> usize {
        self.ports_to_predicate.len()
    }

    /// For every port, the predicates of all equivalence classes that forward to that port.
    pub fn port_to_predicates(&self) -> FxHashMap<PortId, Vec<&Predicate>> {
        let mut result: FxHashMap<PortId, Vec<&Predicate>> = FxHashMap::default();
        for (ports, predicate) in &self.ports_to_predicate {
            for port in ports.all_ports() {
                result.entry(port).or_default().push(predicate);
            }
        }
        result
    }

    /// Find the forwarding behaviour of the given headers, assuming they all belong to
    /// the same equivalence class (e.g. a single header).
    ///
    /// Returns `None` if the predicate is empty or spans multiple classes.
    pub fn find_ports(&self, headers: &Predicate) -> Option<&P> {
        if headers.is_empty() {
            return None;
        }
        self.ports_to_predicate
            .iter()
            .find(|(_, predicate)| headers.is_subset(predicate))
            .map(|(ports, _)| ports)
    }

    /// Check that the rule can be installed into this model: its device and output port
    /// exist and its match fits into the header space.
    pub fn check_rule(&self, rule: &Rule) -> Result<(), String> {
        if rule.device().to_index() >= self.network.num_devices() {
            return Err(format!("Rule `{}` uses an unknown device.", rule));
        }
        if !self.network.is_valid_port(rule.out_port()) {
            return Err(format!("Rule `{}` uses an unknown port.", rule));
        }
        self.header_space.check_rule(rule)
    }
}

/// **(internal)** Management of installed rules.
impl<P: Ports> ModelManager<P> {
    /// Encode the rule and add it to the rule store and the device index.
    ///
    /// Panics if the rule is invalid or already installed.
    pub(super) fn install(&mut self, rule: Rule) -> RuleId {
        if let Err(error) = self.check_rule(&rule) {
            panic!("Cannot insert rule: {}", error);
        }
        let bdd_match = self.header_space.encode_rule(&rule);
        self.install_with_match(rule, bdd_match)
    }

    fn install_with_match(&mut self, rule: Rule, bdd_match: Predicate) -> RuleId {
        if self.rule_to_id.contains_key(&rule) {
            panic!("Cannot insert rule `{}`: it is already installed.", rule);
        }
        let installed = InstalledRule {
            rule: rule.clone(),
            bdd_match,
        };
        let id = match self.free_rule_ids.pop() {
            Some(id) => {
                self.rules[id.0] = Some(installed);
                id
            }
            None => {
                self.rules.push(Some(installed));
                RuleId(self.rules.len() - 1)
            }
        };
        let width = self.header_space.address_width();
        self.device_to_rules[rule.device().to_index()].insert(id, &rule, width);
        self.rule_to_id.insert(rule, id);
        id
    }

    /// Remove the rule from the rule store and the device index, returning the removed
    /// rule with its match predicate.
    ///
    /// Panics if the rule is not installed.
    pub(super) fn uninstall(&mut self, rule: &Rule) -> InstalledRule {
        let id = self
            .rule_to_id
            .remove(rule)
            .unwrap_or_else(|| panic!("Cannot delete rule `{}`: it is not installed.", rule));
        let width = self.header_space.address_width();
        let indexed = self.device_to_rules[rule.device().to_index()].remove(id, rule, width);
        assert!(indexed, "Rule `{}` is missing in the device index.", rule);
        let installed = self.rules[id.0]
            .take()
            .unwrap_or_else(|| panic!("Rule `{}` is missing in the rule store.", rule));
        self.free_rule_ids.push(id);
        installed
    }

    pub(super) fn get_installed(&self, id: RuleId) -> &InstalledRule {
        self.rules[id.0]
            .as_ref()
            .unwrap_or_else(|| panic!("{:?} does not refer to an installed rule.", id))
    }

    pub(super) fn device_index(&self, rule: &Rule) -> &TrieRules {
        &self.device_to_rules[rule.device().to_index()]
    }
}
