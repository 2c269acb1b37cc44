//! Single-task invocation: one collaborator call, timed and isolated.
use std::any::Any;
use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::FutureExt;

use crate::collab::{AsyncCollaborator, Collaborator, Payload};
use crate::error::TaskError;
use crate::workload::Task;

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Success(Payload),
    Failure(TaskError),
}

impl TaskOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success(_))
    }

    #[must_use]
    pub const fn error(&self) -> Option<&TaskError> {
        match self {
            TaskOutcome::Success(_) => None,
            TaskOutcome::Failure(err) => Some(err),
        }
    }
}

/// One task's result. Exactly one exists per task per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub task_index: usize,
    pub outcome: TaskOutcome,
    pub latency: Duration,
}

impl ExecutionResult {
    #[must_use]
    pub const fn failure(task_index: usize, error: TaskError, latency: Duration) -> Self {
        Self {
            task_index,
            outcome: TaskOutcome::Failure(error),
            latency,
        }
    }
}

/// Wraps a collaborator so that no task failure escapes as an error.
#[derive(Clone)]
pub struct TaskRunner {
    collaborator: Arc<dyn Collaborator>,
    timeout: Option<Duration>,
}

impl TaskRunner {
    #[must_use]
    pub fn new(collaborator: Arc<dyn Collaborator>, timeout: Option<Duration>) -> Self {
        Self {
            collaborator,
            timeout,
        }
    }

    #[must_use]
    pub fn collaborator(&self) -> &Arc<dyn Collaborator> {
        &self.collaborator
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Calls the collaborator once on the current thread.
    ///
    /// Errors and panics become [`TaskOutcome::Failure`]. A call that
    /// returns after its timeout is reported as a timeout.
    #[must_use]
    pub fn invoke(&self, task: &Task) -> ExecutionResult {
        let started = Instant::now();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.collaborator.call(task.input(), self.timeout)
        }));
        let latency = started.elapsed();
        let outcome = match outcome {
            Ok(result) => result,
            Err(panic) => Err(panicked(panic.as_ref())),
        };
        self.finish(task, outcome, latency)
    }

    /// Calls an event-loop session once, bounded by the task timeout.
    pub async fn invoke_async(
        &self,
        session: &dyn AsyncCollaborator,
        task: &Task,
    ) -> ExecutionResult {
        let started = Instant::now();
        let call = AssertUnwindSafe(session.call(task.input(), self.timeout)).catch_unwind();
        let outcome = match self.timeout {
            Some(after) => match tokio::time::timeout(after, call).await {
                Ok(outcome) => outcome,
                Err(_) => Ok(Err(TaskError::Timeout { after })),
            },
            None => call.await,
        };
        let latency = started.elapsed();
        let outcome = match outcome {
            Ok(result) => result,
            Err(panic) => Err(panicked(panic.as_ref())),
        };
        self.finish(task, outcome, latency)
    }

    fn finish(
        &self,
        task: &Task,
        outcome: Result<Payload, TaskError>,
        latency: Duration,
    ) -> ExecutionResult {
        let outcome = match (outcome, self.timeout) {
            (Ok(_), Some(after)) if latency > after => {
                TaskOutcome::Failure(TaskError::Timeout { after })
            }
            (Ok(payload), _) => TaskOutcome::Success(payload),
            (Err(err), _) => TaskOutcome::Failure(err),
        };
        ExecutionResult {
            task_index: task.index(),
            outcome,
            latency,
        }
    }
}

fn panicked(panic: &(dyn Any + Send)) -> TaskError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());
    TaskError::Panicked { message }
}

/// Whether two runs produced the same outcome for every task index.
///
/// Ordering and latency are ignored.
#[must_use]
pub fn results_match(left: &[ExecutionResult], right: &[ExecutionResult]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let by_index: HashMap<usize, &TaskOutcome> = left
        .iter()
        .map(|result| (result.task_index, &result.outcome))
        .collect();
    if by_index.len() != left.len() {
        return false;
    }
    right.iter().all(|result| {
        by_index
            .get(&result.task_index)
            .is_some_and(|outcome| **outcome == result.outcome)
    })
}
