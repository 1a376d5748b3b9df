use crate::ports::{PersistentPorts, Ports, PortsNode, TransitionTable};
use crate::{DeviceId, PortId};
use fxhash::FxHasher;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

impl PortsNode {
    /// **(internal)** Build a balanced tree with the given ports as leaves.
    ///
    /// The shape of the tree only depends on the number of leaves, which makes structural
    /// equality the same as content equality.
    fn build(ports: &[PortId]) -> Rc<PortsNode> {
        if ports.len() == 1 {
            Rc::new(PortsNode::Leaf(ports[0]))
        } else {
            let middle = ports.len() / 2;
            PortsNode::branch(
                PortsNode::build(&ports[..middle]),
                PortsNode::build(&ports[middle..]),
            )
        }
    }

    fn branch(left: Rc<PortsNode>, right: Rc<PortsNode>) -> Rc<PortsNode> {
        let mut hasher = FxHasher::default();
        hasher.write_u64(left.hash_value());
        hasher.write_u64(right.hash_value());
        Rc::new(PortsNode::Branch {
            length: left.len() + right.len(),
            hash: hasher.finish(),
            left,
            right,
        })
    }

    fn len(&self) -> usize {
        match self {
            PortsNode::Leaf(_) => 1,
            PortsNode::Branch { length, .. } => *length,
        }
    }

    fn hash_value(&self) -> u64 {
        match self {
            PortsNode::Leaf(port) => {
                let mut hasher = FxHasher::default();
                port.hash(&mut hasher);
                hasher.finish()
            }
            PortsNode::Branch { hash, .. } => *hash,
        }
    }

    fn get(&self, mut index: usize) -> PortId {
        let mut node = self;
        loop {
            match node {
                PortsNode::Leaf(port) => return *port,
                PortsNode::Branch { left, right, .. } => {
                    if index < left.len() {
                        node = left.as_ref();
                    } else {
                        index -= left.len();
                        node = right.as_ref();
                    }
                }
            }
        }
    }

    /// **(internal)** Apply the changes, given as `(leaf index, port)` pairs sorted by
    /// index and relative to the `start` of this sub-tree. Sub-trees without changes
    /// are shared with `node`.
    fn with_changes(
        node: &Rc<PortsNode>,
        start: usize,
        changes: &[(usize, PortId)],
    ) -> Rc<PortsNode> {
        if changes.is_empty() {
            return node.clone();
        }
        match node.as_ref() {
            PortsNode::Leaf(port) => {
                let (_, new_port) = changes[changes.len() - 1];
                if *port == new_port {
                    node.clone()
                } else {
                    Rc::new(PortsNode::Leaf(new_port))
                }
            }
            PortsNode::Branch { left, right, .. } => {
                let split = start + left.len();
                let k = changes.partition_point(|(index, _)| *index < split);
                let new_left = PortsNode::with_changes(left, start, &changes[..k]);
                let new_right = PortsNode::with_changes(right, split, &changes[k..]);
                if Rc::ptr_eq(&new_left, left) && Rc::ptr_eq(&new_right, right) {
                    node.clone()
                } else {
                    PortsNode::branch(new_left, new_right)
                }
            }
        }
    }

    fn content_eq(a: &Rc<PortsNode>, b: &Rc<PortsNode>) -> bool {
        if Rc::ptr_eq(a, b) {
            return true;
        }
        if a.hash_value() != b.hash_value() || a.len() != b.len() {
            return false;
        }
        match (a.as_ref(), b.as_ref()) {
            (PortsNode::Leaf(x), PortsNode::Leaf(y)) => x == y,
            (
                PortsNode::Branch {
                    left: a_left,
                    right: a_right,
                    ..
                },
                PortsNode::Branch {
                    left: b_left,
                    right: b_right,
                    ..
                },
            ) => PortsNode::content_eq(a_left, b_left) && PortsNode::content_eq(a_right, b_right),
            _ => false,
        }
    }
}

impl PersistentPorts {
    /// The number of tree nodes shared by the two assignments (i.e. nodes that are
    /// reachable from both roots). Mostly useful for testing and diagnostics.
    pub fn count_shared_nodes(&self, other: &PersistentPorts) -> usize {
        let mut mine = Vec::new();
        let mut stack: Vec<&Rc<PortsNode>> = self.root.iter().collect();
        while let Some(node) = stack.pop() {
            mine.push(Rc::as_ptr(node));
            if let PortsNode::Branch { left, right, .. } = node.as_ref() {
                stack.push(left);
                stack.push(right);
            }
        }

        let mut shared = 0;
        let mut stack: Vec<&Rc<PortsNode>> = other.root.iter().collect();
        while let Some(node) = stack.pop() {
            if mine.contains(&Rc::as_ptr(node)) {
                shared += 1;
            } else if let PortsNode::Branch { left, right, .. } = node.as_ref() {
                stack.push(left);
                stack.push(right);
            }
        }
        shared
    }
}

impl Ports for PersistentPorts {
    fn create(ordered_ports: &[PortId], offset: usize, length: usize) -> Self {
        let ports = &ordered_ports[offset..(offset + length)];
        PersistentPorts {
            offset,
            root: if ports.is_empty() {
                None
            } else {
                Some(PortsNode::build(ports))
            },
        }
    }

    fn create_with_changes(&self, changes: &TransitionTable) -> Self {
        let changes: Vec<(usize, PortId)> = changes
            .iter()
            .map(|(device, transition)| {
                let index = device.to_index();
                assert!(
                    index >= self.offset && index < self.offset + self.len(),
                    "{} is not covered by this assignment.",
                    device
                );
                (index - self.offset, transition.to)
            })
            .collect();
        PersistentPorts {
            offset: self.offset,
            root: self
                .root
                .as_ref()
                .map(|root| PortsNode::with_changes(root, 0, &changes)),
        }
    }

    fn get(&self, device: DeviceId) -> PortId {
        let index = device.to_index() - self.offset;
        match &self.root {
            Some(root) if index < root.len() => root.get(index),
            _ => panic!("{} is not covered by this assignment.", device),
        }
    }

    fn all_ports(&self) -> Vec<PortId> {
        let mut result = Vec::with_capacity(self.len());
        let mut stack: Vec<&PortsNode> = self.root.iter().map(|it| it.as_ref()).collect();
        while let Some(node) = stack.pop() {
            match node {
                PortsNode::Leaf(port) => result.push(*port),
                PortsNode::Branch { left, right, .. } => {
                    stack.push(right.as_ref());
                    stack.push(left.as_ref());
                }
            }
        }
        result
    }

    fn len(&self) -> usize {
        self.root.as_ref().map(|it| it.len()).unwrap_or(0)
    }
}

impl PartialEq for PersistentPorts {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
            && match (&self.root, &other.root) {
                (Some(a), Some(b)) => PortsNode::content_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl Eq for PersistentPorts {}

impl Hash for PersistentPorts {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
        if let Some(root) = &self.root {
            state.write_u64(root.hash_value());
        }
    }
}
