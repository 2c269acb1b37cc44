//! Derived comparisons over measured runs. Nothing here is persisted.
mod comparator;
mod types;

pub use comparator::{DIMINISHING_RETURNS_THRESHOLD, PARITY_TOLERANCE, ReportComparator};
pub use types::{CandidateComparison, ComparisonReport, ParityPoint};
