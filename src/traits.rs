/// A very basic set trait.
///
/// Notice that we do not assume anything about the members of the set, we can't
/// iterate them or even retrieve them. Header sets are typically far too large for that.
///
/// Also notice that there is no complement method available. To implement complement,
/// use `minus` with an appropriate `unit` set (e.g. `HeaderSpace::mk_everything`).
pub trait Set: Clone {
    fn union(&self, other: &Self) -> Self;
    fn intersect(&self, other: &Self) -> Self;
    fn minus(&self, other: &Self) -> Self;

    fn is_empty(&self) -> bool;
    fn is_subset(&self, other: &Self) -> bool;
}
