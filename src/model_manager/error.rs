/// An error which is returned when the equivalence classes of a `ModelManager` do not form
/// a partition of the header space.
///
/// This always indicates a defect in change computation or aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum PartitionInvariantViolation {
    /// An equivalence class with an empty predicate.
    EmptyClass,
    /// Two equivalence classes share some headers.
    OverlappingClasses { shared_headers: f64 },
    /// Some headers are not covered by any equivalence class.
    IncompleteCover { missing_headers: f64 },
}

impl std::fmt::Display for PartitionInvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartitionInvariantViolation::EmptyClass => {
                write!(f, "Partition contains an empty equivalence class.")
            }
            PartitionInvariantViolation::OverlappingClasses { shared_headers } => write!(
                f,
                "Partition contains overlapping equivalence classes ({} shared headers).",
                shared_headers
            ),
            PartitionInvariantViolation::IncompleteCover { missing_headers } => write!(
                f,
                "Partition does not cover the header space ({} missing headers).",
                missing_headers
            ),
        }
    }
}

impl std::error::Error for PartitionInvariantViolation {}
