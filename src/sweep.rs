//! Baseline-versus-candidate runs across worker counts.
//!
//! Runs happen one at a time so that no two measurements overlap. A run
//! that fails to complete becomes a failed [`RunMetrics`] entry and the
//! sweep moves on to the next worker count.
use std::time::Duration;

use tracing::{info, warn};

use crate::args::PositiveUsize;
use crate::metrics::{MetricsCollector, RunMetrics, SampleInfo};
use crate::runner::ExecutionResult;
use crate::strategy::{ExecutionStrategy, StrategyConfig};
use crate::workload::Task;

/// Metrics of one run plus its results, empty when the run failed.
#[derive(Debug, Clone)]
pub struct Measured {
    pub metrics: RunMetrics,
    pub results: Vec<ExecutionResult>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sweep {
    pub baseline: RunMetrics,
    /// One entry per requested worker count, in request order.
    pub candidates: Vec<RunMetrics>,
}

pub struct ScalingSweepRunner {
    collector: MetricsCollector,
    task_timeout: Option<Duration>,
    baseline_sample: Option<PositiveUsize>,
}

impl ScalingSweepRunner {
    #[must_use]
    pub fn new(collector: MetricsCollector, task_timeout: Option<Duration>) -> Self {
        Self {
            collector,
            task_timeout,
            baseline_sample: None,
        }
    }

    /// Runs the baseline over only the first `sample` tasks.
    #[must_use]
    pub const fn with_baseline_sample(mut self, sample: Option<PositiveUsize>) -> Self {
        self.baseline_sample = sample;
        self
    }

    /// Runs the baseline with a single worker, sampled if configured.
    #[must_use]
    pub fn run_baseline(&self, baseline: &dyn ExecutionStrategy, tasks: &[Task]) -> Measured {
        let Some(sample) = self
            .baseline_sample
            .map(|sample| sample.get().min(tasks.len()))
            .filter(|sample| *sample < tasks.len())
        else {
            return self.run(baseline, tasks, PositiveUsize::ONE);
        };
        info!(
            "Sampling baseline {} over {} of {} tasks",
            baseline.name(),
            sample,
            tasks.len()
        );
        let sampled = tasks.get(..sample).unwrap_or(tasks);
        let mut measured = self.run(baseline, sampled, PositiveUsize::ONE);
        if !measured.metrics.is_failed() {
            measured.metrics = measured.metrics.with_sample(SampleInfo {
                measured_tasks: sample,
                total_tasks: tasks.len(),
            });
        }
        measured
    }

    /// Runs a candidate at one worker count over every task.
    #[must_use]
    pub fn run_candidate(
        &self,
        candidate: &dyn ExecutionStrategy,
        tasks: &[Task],
        worker_count: PositiveUsize,
    ) -> Measured {
        self.run(candidate, tasks, worker_count)
    }

    /// Runs the baseline once, then the candidate once per worker count.
    #[must_use]
    pub fn sweep(
        &self,
        baseline: &dyn ExecutionStrategy,
        candidate: &dyn ExecutionStrategy,
        tasks: &[Task],
        worker_counts: &[PositiveUsize],
    ) -> Sweep {
        let baseline = self.run_baseline(baseline, tasks).metrics;
        let candidates = worker_counts
            .iter()
            .map(|worker_count| self.run_candidate(candidate, tasks, *worker_count).metrics)
            .collect();
        Sweep {
            baseline,
            candidates,
        }
    }

    fn run(
        &self,
        strategy: &dyn ExecutionStrategy,
        tasks: &[Task],
        worker_count: PositiveUsize,
    ) -> Measured {
        let config = StrategyConfig::new(worker_count, self.task_timeout);
        match self.collector.measure_with_results(strategy, tasks, &config) {
            Ok((metrics, results)) => Measured { metrics, results },
            Err(err) => {
                warn!(
                    "{} with {} workers did not complete: {}",
                    strategy.name(),
                    worker_count.get(),
                    err
                );
                Measured {
                    metrics: RunMetrics::failed(
                        strategy.name(),
                        strategy.effective_workers(&config).get(),
                        err.to_string(),
                    ),
                    results: Vec::new(),
                }
            }
        }
    }
}
