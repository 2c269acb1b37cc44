use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use tracing::info;

use crate::error::StrategyError;
use crate::probe::MemoryProbe;
use crate::runner::ExecutionResult;
use crate::strategy::{ExecutionStrategy, StrategyConfig};
use crate::workload::Task;

use super::types::RunMetrics;

/// Serializes measurements; the probes are process-wide.
static MEASUREMENT_LOCK: Mutex<()> = Mutex::new(());

/// Wraps strategy runs with wall-clock and peak-memory probes.
#[derive(Clone)]
pub struct MetricsCollector {
    probe: Arc<dyn MemoryProbe>,
}

impl MetricsCollector {
    #[must_use]
    pub fn new(probe: Arc<dyn MemoryProbe>) -> Self {
        Self { probe }
    }

    #[must_use]
    pub fn probe_name(&self) -> &'static str {
        self.probe.name()
    }

    /// Measures one run.
    ///
    /// # Errors
    ///
    /// Returns the strategy's setup or teardown error.
    pub fn measure(
        &self,
        strategy: &dyn ExecutionStrategy,
        tasks: &[Task],
        config: &StrategyConfig,
    ) -> Result<RunMetrics, StrategyError> {
        self.measure_with_results(strategy, tasks, config)
            .map(|(metrics, _)| metrics)
    }

    /// Measures one run and hands back its results.
    ///
    /// The probe is reset immediately before the timer starts and again
    /// after the peak is read, whether or not the run succeeded.
    ///
    /// # Errors
    ///
    /// Returns the strategy's setup or teardown error.
    pub fn measure_with_results(
        &self,
        strategy: &dyn ExecutionStrategy,
        tasks: &[Task],
        config: &StrategyConfig,
    ) -> Result<(RunMetrics, Vec<ExecutionResult>), StrategyError> {
        let _guard = MEASUREMENT_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let worker_count = strategy.effective_workers(config).get();
        info!(
            "Running {} with {} workers over {} tasks",
            strategy.name(),
            worker_count,
            tasks.len()
        );

        self.probe.reset();
        let started = Instant::now();
        let outcome = strategy.run(tasks, config);
        let wall_time = started.elapsed();
        let reading = self.probe.read();
        self.probe.reset();

        let results = outcome?;
        let metrics = RunMetrics::completed(
            strategy.name(),
            worker_count,
            wall_time,
            reading.peak_bytes,
            &results,
        );
        info!(
            "{} finished in {:.3}s ({} failed, peak {} bytes)",
            metrics.strategy,
            wall_time.as_secs_f64(),
            metrics.failure_count,
            reading.peak_bytes
        );
        Ok((metrics, results))
    }
}
