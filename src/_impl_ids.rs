use crate::{DeviceId, PortId};
use std::fmt::{Display, Error, Formatter};

impl DeviceId {
    pub fn from_index(index: usize) -> DeviceId {
        DeviceId(index)
    }

    pub fn to_index(self) -> usize {
        self.0
    }
}

impl From<usize> for DeviceId {
    fn from(val: usize) -> Self {
        DeviceId(val)
    }
}

impl From<DeviceId> for usize {
    fn from(value: DeviceId) -> Self {
        value.0
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "Device({})", self.0)
    }
}

impl PortId {
    /// Create a port id from a device and a local port index of that device.
    pub fn new(device: DeviceId, index: usize) -> PortId {
        PortId { device, index }
    }

    /// The default port of the given device.
    pub fn default_of(device: DeviceId) -> PortId {
        PortId { device, index: 0 }
    }

    /// The device which owns this port.
    pub fn device(self) -> DeviceId {
        self.device
    }

    /// Index of this port within its device.
    pub fn local_index(self) -> usize {
        self.index
    }

    pub fn is_default(self) -> bool {
        self.index == 0
    }
}

impl Display for PortId {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "Port({}, {})", self.device.0, self.index)
    }
}

#[cfg(test)]
mod tests {
    use crate::{DeviceId, PortId};

    #[test]
    fn port_id_basics() {
        let device = DeviceId::from(3);
        let port = PortId::new(device, 2);
        assert_eq!(device, port.device());
        assert_eq!(2, port.local_index());
        assert!(!port.is_default());
        assert!(PortId::default_of(device).is_default());
        assert_eq!("Port(3, 2)", port.to_string());
        assert_eq!("Device(3)", device.to_string());
        assert_eq!(3usize, usize::from(device));
    }
}
