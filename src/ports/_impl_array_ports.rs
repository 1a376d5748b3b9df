use crate::ports::{ArrayPorts, Ports, TransitionTable};
use crate::{DeviceId, PortId};

impl Ports for ArrayPorts {
    fn create(ordered_ports: &[PortId], offset: usize, length: usize) -> Self {
        ArrayPorts {
            offset,
            ports: ordered_ports[offset..(offset + length)].to_vec(),
        }
    }

    fn create_with_changes(&self, changes: &TransitionTable) -> Self {
        let mut ports = self.ports.clone();
        for (device, transition) in changes {
            ports[device.to_index() - self.offset] = transition.to;
        }
        ArrayPorts {
            offset: self.offset,
            ports,
        }
    }

    fn get(&self, device: DeviceId) -> PortId {
        self.ports[device.to_index() - self.offset]
    }

    fn all_ports(&self) -> Vec<PortId> {
        self.ports.clone()
    }

    fn len(&self) -> usize {
        self.ports.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::ports::{ArrayPorts, PortTransition, Ports, TransitionTable};
    use crate::{DeviceId, PortId};

    #[test]
    fn array_ports_changes() {
        let defaults: Vec<PortId> = (0..4)
            .map(|i| PortId::default_of(DeviceId::from(i)))
            .collect();
        let ports = ArrayPorts::create(&defaults, 0, 4);
        assert_eq!(4, ports.len());
        assert_eq!(defaults, ports.all_ports());

        let d2 = DeviceId::from(2);
        let mut changes = TransitionTable::new();
        changes.insert(
            d2,
            PortTransition {
                from: None,
                to: PortId::new(d2, 1),
            },
        );
        let changed = ports.create_with_changes(&changes);
        assert_eq!(PortId::new(d2, 1), changed.get(d2));
        assert_eq!(defaults[1], changed.get(DeviceId::from(1)));
        assert_ne!(ports, changed);
        // The original is not modified.
        assert_eq!(defaults[2], ports.get(d2));

        let partial = ArrayPorts::create(&defaults, 1, 2);
        assert_eq!(vec![defaults[1], defaults[2]], partial.all_ports());
        assert_eq!(defaults[2], partial.get(d2));
    }
}
