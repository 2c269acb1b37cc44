use std::sync::Arc;

use tracing::debug;

use crate::args::PositiveUsize;
use crate::collab::Collaborator;
use crate::error::StrategyError;
use crate::runner::{ExecutionResult, TaskRunner};
use crate::workload::Task;

use super::{ExecutionStrategy, StrategyConfig};

/// Runs tasks one after another on the calling thread, in generation order.
pub struct Sequential {
    collaborator: Arc<dyn Collaborator>,
}

impl Sequential {
    #[must_use]
    pub fn new(collaborator: Arc<dyn Collaborator>) -> Self {
        Self { collaborator }
    }
}

impl ExecutionStrategy for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn effective_workers(&self, _config: &StrategyConfig) -> PositiveUsize {
        PositiveUsize::ONE
    }

    fn run(
        &self,
        tasks: &[Task],
        config: &StrategyConfig,
    ) -> Result<Vec<ExecutionResult>, StrategyError> {
        let runner = TaskRunner::new(Arc::clone(&self.collaborator), config.task_timeout);
        debug!(
            "Running {} tasks sequentially against {}",
            tasks.len(),
            self.collaborator.name()
        );
        Ok(tasks.iter().map(|task| runner.invoke(task)).collect())
    }
}
