use std::time::Duration;
use thiserror::Error;

/// Failure of a single task. Recorded in its result, never propagated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Network error: {message}")]
    Network { message: String },
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },
    #[error("Failed to decode response: {message}")]
    Decode { message: String },
    #[error("Collaborator '{collaborator}' cannot run {input} tasks")]
    Unsupported { collaborator: String, input: String },
    #[error("Task timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },
    #[error("Computation failed: {message}")]
    Compute { message: String },
    #[error("Task panicked: {message}")]
    Panicked { message: String },
    #[error("Worker process lost: {message}")]
    WorkerLost { message: String },
}

impl TaskError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            TaskError::Network { .. } => "network",
            TaskError::Status { .. } => "status",
            TaskError::Decode { .. } => "decode",
            TaskError::Unsupported { .. } => "unsupported",
            TaskError::Timeout { .. } => "timeout",
            TaskError::Compute { .. } => "compute",
            TaskError::Panicked { .. } => "panicked",
            TaskError::WorkerLost { .. } => "worker_lost",
        }
    }
}
