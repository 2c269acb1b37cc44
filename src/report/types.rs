use crate::metrics::RunMetrics;

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateComparison {
    pub metrics: RunMetrics,
    /// Baseline wall time over candidate wall time.
    pub speedup_ratio: Option<f64>,
    pub efficiency_percent: Option<f64>,
    /// Candidate peak memory over baseline peak memory.
    pub memory_ratio: Option<f64>,
}

/// First candidate whose wall time is within the parity tolerance of the
/// baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct ParityPoint {
    pub strategy: String,
    pub worker_count: usize,
    pub memory_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonReport {
    pub baseline: RunMetrics,
    pub candidates: Vec<CandidateComparison>,
    pub diminishing_returns_point: Option<usize>,
    pub parity_point: Option<ParityPoint>,
    /// Theoretical speedup ceiling for CPU-bound candidates.
    pub available_parallelism: usize,
}
