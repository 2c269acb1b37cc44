use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tracing::debug;

use crate::args::PositiveUsize;
use crate::collab::Collaborator;
use crate::error::StrategyError;
use crate::runner::{ExecutionResult, TaskRunner};
use crate::workload::Task;

use super::{ExecutionStrategy, StrategyConfig, ensure_complete};

/// Single-threaded cooperative scheduler.
///
/// Every task is in flight at once on a current-thread runtime built for the
/// run. Tasks yield only while the collaborator waits on I/O; blocking work
/// holds the loop until it returns.
pub struct EventLoop {
    collaborator: Arc<dyn Collaborator>,
}

impl EventLoop {
    #[must_use]
    pub fn new(collaborator: Arc<dyn Collaborator>) -> Self {
        Self { collaborator }
    }
}

impl ExecutionStrategy for EventLoop {
    fn name(&self) -> &'static str {
        "event-loop"
    }

    fn effective_workers(&self, _config: &StrategyConfig) -> PositiveUsize {
        PositiveUsize::ONE
    }

    fn run(
        &self,
        tasks: &[Task],
        config: &StrategyConfig,
    ) -> Result<Vec<ExecutionResult>, StrategyError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|source| StrategyError::EventLoop { source })?;
        let runner = TaskRunner::new(Arc::clone(&self.collaborator), config.task_timeout);

        let results = runtime.block_on(async {
            let session = self.collaborator.open_session()?;
            debug!(
                "Submitting {} tasks to the event loop against {}",
                tasks.len(),
                self.collaborator.name()
            );
            let mut pending: FuturesUnordered<_> = tasks
                .iter()
                .map(|task| runner.invoke_async(session.as_ref(), task))
                .collect();
            let mut results = Vec::with_capacity(tasks.len());
            while let Some(result) = pending.next().await {
                results.push(result);
            }
            Ok::<_, StrategyError>(results)
        })?;

        ensure_complete(tasks.len(), results.len())?;
        Ok(results)
    }
}
