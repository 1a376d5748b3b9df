use crate::{Device, DeviceId, DeviceIdIterator, Network, PortId, DEFAULT_PORT_NAME};
use std::ops::Index;

/// Methods for safely constructing new instances of `Network`s.
impl Network {
    /// Create a new `Network` without any devices.
    pub fn new() -> Network {
        Network::default()
    }

    /// Create a new `Network` with devices using the given names. Every device only has
    /// its default port.
    ///
    /// Returns `Err` when the names are not unique.
    pub fn from_device_names(names: &[&str]) -> Result<Network, String> {
        let mut network = Network::new();
        for name in names {
            network.add_device(name)?;
        }
        Ok(network)
    }

    /// Add a new `Device` to this `Network`. The device is created with a single
    /// port named `default`.
    ///
    /// Returns `Err` if a device of the same name already exists.
    pub fn add_device(&mut self, name: &str) -> Result<DeviceId, String> {
        if self.device_to_index.contains_key(name) {
            return Err(format!("Invalid device: {} already exists.", name));
        }
        let id = DeviceId(self.devices.len());
        self.devices.push(Device {
            name: name.to_string(),
            ports: vec![DEFAULT_PORT_NAME.to_string()],
        });
        self.device_to_index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Add a new named port to the given device.
    ///
    /// Returns `Err` if the device does not exist or already has a port with the same name.
    pub fn add_port(&mut self, device: DeviceId, name: &str) -> Result<PortId, String> {
        if device.0 >= self.devices.len() {
            return Err(format!("Invalid device: {} does not exist.", device));
        }
        if self.find_port(device, name).is_some() {
            return Err(format!(
                "Invalid port: {} already exists on device {}.",
                name,
                self.get_device_name(device)
            ));
        }
        let ports = &mut self.devices[device.0].ports;
        ports.push(name.to_string());
        Ok(PortId::new(device, ports.len() - 1))
    }
}

/// Some basic utility methods for inspecting the `Network`.
impl Network {
    /// The number of devices in this `Network`.
    pub fn num_devices(&self) -> usize {
        self.devices.len()
    }

    /// Find a `DeviceId` corresponding to the given device name.
    pub fn find_device(&self, name: &str) -> Option<DeviceId> {
        self.device_to_index.get(name).cloned()
    }

    /// Find a port of the given device by its name.
    pub fn find_port(&self, device: DeviceId, name: &str) -> Option<PortId> {
        self.devices[device.0]
            .ports
            .iter()
            .position(|it| it == name)
            .map(|index| PortId::new(device, index))
    }

    /// The well-known default port of the given device.
    pub fn default_port(&self, device: DeviceId) -> PortId {
        PortId::default_of(device)
    }

    /// Return a list of default ports of all devices, ordered by `DeviceId`.
    pub fn default_ports(&self) -> Vec<PortId> {
        self.devices().map(PortId::default_of).collect()
    }

    /// Return an iterator over all device ids of this network.
    pub fn devices(&self) -> DeviceIdIterator {
        (0..self.devices.len()).map(DeviceId)
    }

    /// Return an iterator over all ports of the given device.
    pub fn ports(&self, device: DeviceId) -> impl Iterator<Item = PortId> {
        (0..self.devices[device.0].ports.len()).map(move |index| PortId::new(device, index))
    }

    /// Shorthand for `network[device].get_name()`.
    pub fn get_device_name(&self, device: DeviceId) -> &String {
        &self.devices[device.0].name
    }

    /// Name of the given port.
    pub fn get_port_name(&self, port: PortId) -> &String {
        &self.devices[port.device.0].ports[port.index]
    }

    /// True if the port id refers to an existing port of this network.
    pub fn is_valid_port(&self, port: PortId) -> bool {
        self.devices
            .get(port.device.0)
            .map(|device| port.index < device.ports.len())
            .unwrap_or(false)
    }
}

impl Device {
    pub fn get_name(&self) -> &String {
        &self.name
    }

    /// Number of ports of this device, including the default port.
    pub fn num_ports(&self) -> usize {
        self.ports.len()
    }
}

/// Allow indexing `Network` using `DeviceId` objects.
impl Index<DeviceId> for Network {
    type Output = Device;

    fn index(&self, index: DeviceId) -> &Self::Output {
        &self.devices[index.0]
    }
}

#[cfg(test)]
mod tests {
    use crate::{DeviceId, Network, PortId, DEFAULT_PORT_NAME};

    #[test]
    fn build_network() {
        let mut network = Network::from_device_names(&["s1", "s2"]).unwrap();
        let s1 = network.find_device("s1").unwrap();
        let s2 = network.find_device("s2").unwrap();
        assert_eq!(2, network.num_devices());
        assert_eq!(None, network.find_device("s3"));
        assert_eq!(vec![s1, s2], network.devices().collect::<Vec<_>>());

        let p1 = network.add_port(s1, "p1").unwrap();
        assert_eq!(PortId::new(s1, 1), p1);
        assert_eq!(Some(p1), network.find_port(s1, "p1"));
        assert_eq!(None, network.find_port(s2, "p1"));
        let p2 = network.add_port(s2, "p1").unwrap();
        assert_eq!(PortId::new(s2, 1), p2);

        assert_eq!("p1", network.get_port_name(p1));
        assert_eq!(DEFAULT_PORT_NAME, network.get_port_name(network.default_port(s2)));
        assert_eq!("s2", network[s2].get_name());
        assert_eq!(2, network[s1].num_ports());
        assert_eq!(
            vec![PortId::default_of(s1), PortId::default_of(s2)],
            network.default_ports()
        );
        assert_eq!(2, network.ports(s1).count());
        assert!(network.is_valid_port(p2));
        assert!(!network.is_valid_port(PortId::new(s2, 5)));
    }

    #[test]
    fn build_network_invalid() {
        let mut network = Network::from_device_names(&["s1"]).unwrap();
        let s1 = network.find_device("s1").unwrap();
        assert!(network.add_device("s1").is_err());
        assert!(network.add_port(s1, DEFAULT_PORT_NAME).is_err());
        assert!(network.add_port(DeviceId::from(5), "p1").is_err());
        assert_eq!(1, network[s1].num_ports());
        assert!(Network::from_device_names(&["a", "b", "a"]).is_err());
    }
}
