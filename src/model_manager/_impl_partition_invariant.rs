use crate::model_manager::{ModelManager, PartitionInvariantViolation};
use crate::ports::Ports;
use crate::traits::Set;

impl<P: Ports> ModelManager<P> {
    /// Verify that the equivalence classes are non-empty, pairwise disjoint and cover
    /// the whole header space.
    ///
    /// This is a relatively expensive operation (linear in the number of classes) intended
    /// for testing. With the `shields-up` feature, it runs after every applied delta.
    pub fn check_partition(&self) -> Result<(), PartitionInvariantViolation> {
        let mut covered = self.header_space.mk_nothing();
        for predicate in self.ports_to_predicate.values() {
            if predicate.is_empty() {
                return Err(PartitionInvariantViolation::EmptyClass);
            }
            let shared = covered.intersect(predicate);
            if !shared.is_empty() {
                return Err(PartitionInvariantViolation::OverlappingClasses {
                    shared_headers: shared.approx_cardinality(),
                });
            }
            covered = covered.union(predicate);
        }
        let missing = self.header_space.mk_everything().minus(&covered);
        if !missing.is_empty() {
            return Err(PartitionInvariantViolation::IncompleteCover {
                missing_headers: missing.approx_cardinality(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ports::{ArrayPorts, Ports};
    use crate::{ModelManager, Network, PartitionInvariantViolation, PortId};
    use pretty_assertions::assert_eq;

    #[test]
    fn detect_violations() {
        let mut network = Network::from_device_names(&["s1"]).unwrap();
        let s1 = network.find_device("s1").unwrap();
        let p1 = network.add_port(s1, "p1").unwrap();
        let mut manager: ModelManager<ArrayPorts> =
            ModelManager::with_address_width(network, 4).unwrap();
        assert_eq!(Ok(()), manager.check_partition());

        let space = manager.header_space().clone();
        let other = ArrayPorts::create(&[p1], 0, 1);
        let default = ArrayPorts::create(&[PortId::default_of(s1)], 0, 1);

        manager.ports_to_predicate.insert(other.clone(), space.mk_nothing());
        assert_eq!(
            Err(PartitionInvariantViolation::EmptyClass),
            manager.check_partition()
        );

        // 16 destinations times 8 sources.
        manager
            .ports_to_predicate
            .insert(other.clone(), space.encode(0, 0, 0, 1));
        assert_eq!(
            Err(PartitionInvariantViolation::OverlappingClasses {
                shared_headers: 128.0
            }),
            manager.check_partition()
        );

        manager.ports_to_predicate.remove(&default);
        assert_eq!(
            Err(PartitionInvariantViolation::IncompleteCover {
                missing_headers: 128.0
            }),
            manager.check_partition()
        );
        assert!(manager
            .check_partition()
            .unwrap_err()
            .to_string()
            .contains("missing"));
    }
}
