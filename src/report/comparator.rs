use std::num::NonZeroUsize;
use std::time::Duration;

use crate::metrics::RunMetrics;

use super::types::{CandidateComparison, ComparisonReport, ParityPoint};

/// A step shows diminishing returns when its speedup grows by less than this
/// fraction of its worker-count growth. Heuristic only.
pub const DIMINISHING_RETURNS_THRESHOLD: f64 = 0.5;

/// A candidate reaches parity when its wall time is at most this multiple of
/// the baseline's.
pub const PARITY_TOLERANCE: f64 = 1.2;

/// Turns a baseline and its candidates into a [`ComparisonReport`].
#[derive(Debug, Clone, Copy)]
pub struct ReportComparator {
    available_parallelism: usize,
}

impl Default for ReportComparator {
    /// Uses the host's available parallelism, or 1 when it is unknown.
    fn default() -> Self {
        Self::new(
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
        )
    }
}

impl ReportComparator {
    #[must_use]
    pub const fn new(available_parallelism: usize) -> Self {
        Self {
            available_parallelism,
        }
    }

    /// Compares each candidate against the baseline, in candidate order.
    ///
    /// Ratios are `None` whenever either side failed or a denominator is
    /// zero. A sampled baseline is compared by its projected wall time.
    #[must_use]
    pub fn compare(&self, baseline: &RunMetrics, candidates: &[RunMetrics]) -> ComparisonReport {
        let baseline_wall = baseline.projected_wall_time();
        let speedups: Vec<Option<f64>> = candidates
            .iter()
            .map(|candidate| ratio(baseline_wall, candidate.wall_time))
            .collect();
        let reference = efficiency_reference(baseline, candidates, &speedups);

        let compared: Vec<CandidateComparison> = candidates
            .iter()
            .zip(&speedups)
            .map(|(candidate, speedup)| CandidateComparison {
                metrics: candidate.clone(),
                speedup_ratio: *speedup,
                efficiency_percent: efficiency(*speedup, candidate.worker_count, reference),
                memory_ratio: memory_ratio(baseline, candidate),
            })
            .collect();

        let parity_point = parity_point(baseline_wall, &compared);
        ComparisonReport {
            baseline: baseline.clone(),
            diminishing_returns_point: diminishing_returns_point(&compared),
            parity_point,
            candidates: compared,
            available_parallelism: self.available_parallelism,
        }
    }
}

/// Speedup and worker count that efficiency is measured against.
fn efficiency_reference(
    baseline: &RunMetrics,
    candidates: &[RunMetrics],
    speedups: &[Option<f64>],
) -> Option<(f64, usize)> {
    if baseline.worker_count == 1 {
        return Some((1.0, 1));
    }
    candidates
        .iter()
        .zip(speedups)
        .find_map(|(candidate, speedup)| speedup.map(|speedup| (speedup, candidate.worker_count)))
}

fn efficiency(
    speedup: Option<f64>,
    worker_count: usize,
    reference: Option<(f64, usize)>,
) -> Option<f64> {
    let speedup = speedup?;
    let (reference_speedup, reference_workers) = reference?;
    if reference_workers == 0 || worker_count == 0 || reference_speedup <= 0.0 {
        return None;
    }
    let worker_ratio = worker_count as f64 / reference_workers as f64;
    Some(speedup / reference_speedup / worker_ratio * 100.0)
}

fn ratio(numerator: Option<Duration>, denominator: Option<Duration>) -> Option<f64> {
    let numerator = numerator?;
    let denominator = denominator?;
    if denominator.is_zero() {
        return None;
    }
    Some(numerator.as_secs_f64() / denominator.as_secs_f64())
}

fn memory_ratio(baseline: &RunMetrics, candidate: &RunMetrics) -> Option<f64> {
    let baseline_peak = baseline.peak_memory_bytes?;
    let candidate_peak = candidate.peak_memory_bytes?;
    if baseline_peak == 0 {
        return None;
    }
    Some(candidate_peak as f64 / baseline_peak as f64)
}

fn diminishing_returns_point(candidates: &[CandidateComparison]) -> Option<usize> {
    let completed: Vec<(&str, usize, f64)> = candidates
        .iter()
        .filter_map(|candidate| {
            candidate.speedup_ratio.map(|speedup| {
                (
                    candidate.metrics.strategy.as_str(),
                    candidate.metrics.worker_count,
                    speedup,
                )
            })
        })
        .collect();
    completed.windows(2).find_map(|pair| {
        let [(previous_name, previous_workers, previous_speedup), (name, workers, speedup)] =
            pair
        else {
            return None;
        };
        if previous_name != name || workers <= previous_workers || *previous_speedup <= 0.0 {
            return None;
        }
        let speedup_growth = speedup / previous_speedup;
        let worker_growth = *workers as f64 / *previous_workers as f64;
        (speedup_growth < DIMINISHING_RETURNS_THRESHOLD * worker_growth).then_some(*workers)
    })
}

fn parity_point(
    baseline_wall: Option<Duration>,
    candidates: &[CandidateComparison],
) -> Option<ParityPoint> {
    let limit = baseline_wall?.as_secs_f64() * PARITY_TOLERANCE;
    candidates
        .iter()
        .find(|candidate| {
            candidate
                .metrics
                .wall_time
                .is_some_and(|wall| wall.as_secs_f64() <= limit)
        })
        .map(|candidate| ParityPoint {
            strategy: candidate.metrics.strategy.clone(),
            worker_count: candidate.metrics.worker_count,
            memory_ratio: candidate.memory_ratio,
        })
}
