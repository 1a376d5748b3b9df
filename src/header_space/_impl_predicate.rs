use crate::header_space::Predicate;
use crate::traits::Set;
use biodivine_lib_bdd::Bdd;

impl Predicate {
    pub fn new(bdd: Bdd) -> Predicate {
        Predicate { bdd }
    }

    /// A reference to the underlying `Bdd`.
    pub fn as_bdd(&self) -> &Bdd {
        &self.bdd
    }

    pub fn into_bdd(self) -> Bdd {
        self.bdd
    }

    /// True if this predicate contains every header.
    pub fn is_everything(&self) -> bool {
        self.bdd.is_true()
    }

    /// Compute the number of BDD nodes required to represent this predicate.
    pub fn symbolic_size(&self) -> usize {
        self.bdd.size()
    }

    /// Compute an "approximate" number of headers in this predicate.
    ///
    /// The value is approximate because the limitations of `f64` can apply during computation.
    pub fn approx_cardinality(&self) -> f64 {
        self.bdd.cardinality()
    }
}

impl Set for Predicate {
    fn union(&self, other: &Self) -> Self {
        Predicate::new(self.bdd.or(&other.bdd))
    }

    fn intersect(&self, other: &Self) -> Self {
        Predicate::new(self.bdd.and(&other.bdd))
    }

    fn minus(&self, other: &Self) -> Self {
        Predicate::new(self.bdd.and_not(&other.bdd))
    }

    fn is_empty(&self) -> bool {
        self.bdd.is_false()
    }

    fn is_subset(&self, other: &Self) -> bool {
        self.bdd.and_not(&other.bdd).is_false()
    }
}

impl PartialEq for Predicate {
    fn eq(&self, other: &Self) -> bool {
        self.bdd.xor(&other.bdd).is_false()
    }
}

impl Eq for Predicate {}
