use std::time::Duration;

use tracing::warn;

use crate::runner::ExecutionResult;

use super::histogram::LatencyHistogram;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencySummary {
    pub min: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p90: Duration,
    pub p99: Duration,
    pub max: Duration,
}

/// A run measured over the first `measured_tasks` of `total_tasks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleInfo {
    pub measured_tasks: usize,
    pub total_tasks: usize,
}

/// Outcome of one measured strategy run.
///
/// `wall_time` is `None` for a run that failed to complete; such entries
/// carry the setup error in `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    pub strategy: String,
    pub worker_count: usize,
    pub wall_time: Option<Duration>,
    pub peak_memory_bytes: Option<u64>,
    pub result_count: usize,
    pub failure_count: usize,
    pub timeout_count: usize,
    pub latency: Option<LatencySummary>,
    pub sample: Option<SampleInfo>,
    pub error: Option<String>,
}

impl RunMetrics {
    #[must_use]
    pub fn completed(
        strategy: &str,
        worker_count: usize,
        wall_time: Duration,
        peak_memory_bytes: u64,
        results: &[ExecutionResult],
    ) -> Self {
        let failure_count = results
            .iter()
            .filter(|result| !result.outcome.is_success())
            .count();
        let timeout_count = results
            .iter()
            .filter(|result| result.outcome.error().is_some_and(|err| err.is_timeout()))
            .count();
        Self {
            strategy: strategy.to_owned(),
            worker_count,
            wall_time: Some(wall_time),
            peak_memory_bytes: Some(peak_memory_bytes),
            result_count: results.len(),
            failure_count,
            timeout_count,
            latency: summarize_latency(results),
            sample: None,
            error: None,
        }
    }

    /// Sentinel for a run that never completed.
    #[must_use]
    pub fn failed(strategy: &str, worker_count: usize, error: String) -> Self {
        Self {
            strategy: strategy.to_owned(),
            worker_count,
            wall_time: None,
            peak_memory_bytes: None,
            result_count: 0,
            failure_count: 0,
            timeout_count: 0,
            latency: None,
            sample: None,
            error: Some(error),
        }
    }

    #[must_use]
    pub const fn with_sample(mut self, sample: SampleInfo) -> Self {
        self.sample = Some(sample);
        self
    }

    #[must_use]
    pub const fn is_failed(&self) -> bool {
        self.wall_time.is_none()
    }

    /// Wall time scaled to the full task count when the run was sampled.
    #[must_use]
    pub fn projected_wall_time(&self) -> Option<Duration> {
        let wall_time = self.wall_time?;
        let Some(sample) = self.sample else {
            return Some(wall_time);
        };
        let measured = u128::try_from(sample.measured_tasks).ok()?;
        let total = u128::try_from(sample.total_tasks).ok()?;
        let nanos = wall_time
            .as_nanos()
            .checked_mul(total)?
            .checked_div(measured)?;
        Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
    }
}

fn summarize_latency(results: &[ExecutionResult]) -> Option<LatencySummary> {
    let mut histogram = match LatencyHistogram::new() {
        Ok(histogram) => histogram,
        Err(err) => {
            warn!("{}", err);
            return None;
        }
    };
    for result in results {
        if let Err(err) = histogram.record(result.latency) {
            warn!("{}", err);
        }
    }
    histogram.summary()
}
