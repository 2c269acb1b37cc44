//! Scheduling disciplines behind one `run(tasks, config)` contract.
//!
//! A strategy fails as a whole only when it cannot set up or tear down its
//! workers. Task failures are carried inside the returned results.
mod event_loop;
mod process_pool;
mod sequential;
mod thread_pool;


use std::sync::Arc;
use std::time::Duration;

use crate::args::{PositiveUsize, StrategyKind};
use crate::collab::Collaborator;
use crate::error::StrategyError;
use crate::runner::ExecutionResult;
use crate::workload::Task;

pub use event_loop::EventLoop;
pub use process_pool::{ProcessPool, WorkerCommand, run_worker};
pub use sequential::Sequential;
pub use thread_pool::ThreadPool;

/// Per-run settings. Not retained between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyConfig {
    pub worker_count: PositiveUsize,
    pub task_timeout: Option<Duration>,
}

impl StrategyConfig {
    #[must_use]
    pub const fn new(worker_count: PositiveUsize, task_timeout: Option<Duration>) -> Self {
        Self {
            worker_count,
            task_timeout,
        }
    }
}

pub trait ExecutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Worker count this strategy actually uses for `config`.
    fn effective_workers(&self, config: &StrategyConfig) -> PositiveUsize {
        config.worker_count
    }

    /// Runs every task once. Results come back in completion order.
    ///
    /// # Errors
    ///
    /// Returns an error when workers cannot be started or stopped, or when
    /// the run loses results.
    fn run(
        &self,
        tasks: &[Task],
        config: &StrategyConfig,
    ) -> Result<Vec<ExecutionResult>, StrategyError>;
}

/// Builds the strategy for `kind` around a shared collaborator.
///
/// # Errors
///
/// Returns an error when the worker executable for the process pool cannot
/// be resolved.
pub fn build(
    kind: StrategyKind,
    collaborator: Arc<dyn Collaborator>,
) -> Result<Box<dyn ExecutionStrategy>, StrategyError> {
    let strategy: Box<dyn ExecutionStrategy> = match kind {
        StrategyKind::Sequential => Box::new(Sequential::new(collaborator)),
        StrategyKind::EventLoop => Box::new(EventLoop::new(collaborator)),
        StrategyKind::ThreadPool => Box::new(ThreadPool::new(collaborator)),
        StrategyKind::ProcessPool => Box::new(ProcessPool::new(
            collaborator,
            WorkerCommand::current_exe()?,
        )),
    };
    Ok(strategy)
}

pub(crate) fn ensure_complete(
    expected: usize,
    received: usize,
) -> Result<(), StrategyError> {
    if expected == received {
        Ok(())
    } else {
        Err(StrategyError::Incomplete { expected, received })
    }
}
