//! Messages exchanged with worker processes, one JSON object per line.
use std::io::{BufRead, Read, Write};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::collab::{CollaboratorSpec, Payload};
use crate::error::{FrameError, TaskError};
use crate::runner::{ExecutionResult, TaskOutcome};
use crate::workload::{Endpoint, EndpointCategory, Task, TaskInput};

const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum Request {
    Configure {
        collaborator: CollaboratorSpec,
        timeout_us: Option<u64>,
    },
    Run {
        task: WireTask,
    },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum Reply {
    Ready { pid: u32 },
    Result { result: WireResult },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct WireTask {
    pub(super) index: usize,
    pub(super) input: WireInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(super) enum WireInput {
    Fetch { category: String, id: u64 },
    Compute { bound: u64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct WireResult {
    pub(super) task_index: usize,
    pub(super) outcome: WireOutcome,
    pub(super) latency_us: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(super) enum WireOutcome {
    Json { value: serde_json::Value },
    Primes { range: u64, prime_count: u64 },
    Failure { error: WireError },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(super) enum WireError {
    Network { message: String },
    Status { status: u16 },
    Decode { message: String },
    Unsupported { collaborator: String, input: String },
    Timeout { after_us: u64 },
    Compute { message: String },
    Panicked { message: String },
    WorkerLost { message: String },
}

pub(super) fn duration_to_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

impl From<&Task> for WireTask {
    fn from(task: &Task) -> Self {
        let input = match task.input() {
            TaskInput::Fetch(endpoint) => WireInput::Fetch {
                category: endpoint.category.as_str().to_owned(),
                id: endpoint.id,
            },
            TaskInput::Compute(bound) => WireInput::Compute { bound: *bound },
        };
        Self {
            index: task.index(),
            input,
        }
    }
}

impl TryFrom<WireTask> for Task {
    type Error = String;

    fn try_from(task: WireTask) -> Result<Self, Self::Error> {
        let input = match task.input {
            WireInput::Fetch { category, id } => {
                let category = EndpointCategory::parse(&category)
                    .ok_or_else(|| format!("Unknown endpoint category '{}'", category))?;
                TaskInput::Fetch(Endpoint { category, id })
            }
            WireInput::Compute { bound } => TaskInput::Compute(bound),
        };
        Ok(Task::new(task.index, input))
    }
}

impl From<ExecutionResult> for WireResult {
    fn from(result: ExecutionResult) -> Self {
        let outcome = match result.outcome {
            TaskOutcome::Success(Payload::Json(value)) => WireOutcome::Json { value },
            TaskOutcome::Success(Payload::Primes { range, prime_count }) => {
                WireOutcome::Primes { range, prime_count }
            }
            TaskOutcome::Failure(error) => WireOutcome::Failure {
                error: WireError::from(error),
            },
        };
        Self {
            task_index: result.task_index,
            outcome,
            latency_us: duration_to_us(result.latency),
        }
    }
}

impl From<WireResult> for ExecutionResult {
    fn from(result: WireResult) -> Self {
        let outcome = match result.outcome {
            WireOutcome::Json { value } => TaskOutcome::Success(Payload::Json(value)),
            WireOutcome::Primes { range, prime_count } => {
                TaskOutcome::Success(Payload::Primes { range, prime_count })
            }
            WireOutcome::Failure { error } => TaskOutcome::Failure(TaskError::from(error)),
        };
        Self {
            task_index: result.task_index,
            outcome,
            latency: Duration::from_micros(result.latency_us),
        }
    }
}

impl From<TaskError> for WireError {
    fn from(error: TaskError) -> Self {
        match error {
            TaskError::Network { message } => WireError::Network { message },
            TaskError::Status { status } => WireError::Status { status },
            TaskError::Decode { message } => WireError::Decode { message },
            TaskError::Unsupported {
                collaborator,
                input,
            } => WireError::Unsupported {
                collaborator,
                input,
            },
            TaskError::Timeout { after } => WireError::Timeout {
                after_us: duration_to_us(after),
            },
            TaskError::Compute { message } => WireError::Compute { message },
            TaskError::Panicked { message } => WireError::Panicked { message },
            TaskError::WorkerLost { message } => WireError::WorkerLost { message },
        }
    }
}

impl From<WireError> for TaskError {
    fn from(error: WireError) -> Self {
        match error {
            WireError::Network { message } => TaskError::Network { message },
            WireError::Status { status } => TaskError::Status { status },
            WireError::Decode { message } => TaskError::Decode { message },
            WireError::Unsupported {
                collaborator,
                input,
            } => TaskError::Unsupported {
                collaborator,
                input,
            },
            WireError::Timeout { after_us } => TaskError::Timeout {
                after: Duration::from_micros(after_us),
            },
            WireError::Compute { message } => TaskError::Compute { message },
            WireError::Panicked { message } => TaskError::Panicked { message },
            WireError::WorkerLost { message } => TaskError::WorkerLost { message },
        }
    }
}

pub(super) fn read_message<R, T>(reader: &mut R) -> Result<T, FrameError>
where
    R: BufRead,
    T: DeserializeOwned,
{
    let mut buffer: Vec<u8> = Vec::with_capacity(1024);
    let limit = u64::try_from(MAX_MESSAGE_BYTES.saturating_add(1)).unwrap_or(u64::MAX);
    let bytes = reader.by_ref().take(limit).read_until(b'\n', &mut buffer)?;
    if bytes == 0 {
        return Err(FrameError::Closed);
    }
    if buffer.len() > MAX_MESSAGE_BYTES {
        return Err(FrameError::TooLarge {
            max_bytes: MAX_MESSAGE_BYTES,
        });
    }
    if buffer.ends_with(b"\n") {
        buffer.pop();
        if buffer.ends_with(b"\r") {
            buffer.pop();
        }
    }
    Ok(serde_json::from_slice(&buffer)?)
}

pub(super) fn send_message<W, T>(writer: &mut W, message: &T) -> Result<(), FrameError>
where
    W: Write,
    T: Serialize,
{
    let mut payload = serde_json::to_vec(message)?;
    payload.push(b'\n');
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn fetch_task_survives_the_wire() -> Result<(), String> {
        let task = Task::new(
            4,
            TaskInput::Fetch(Endpoint {
                category: EndpointCategory::Todos,
                id: 12,
            }),
        );
        let mut buffer = Vec::new();
        send_message(
            &mut buffer,
            &Request::Run {
                task: WireTask::from(&task),
            },
        )
        .map_err(|err| err.to_string())?;
        let mut reader = Cursor::new(buffer);
        let request: Request = read_message(&mut reader).map_err(|err| err.to_string())?;
        let wire = match request {
            Request::Run { task } => task,
            other => return Err(format!("Unexpected request: {:?}", other)),
        };
        let decoded = Task::try_from(wire)?;
        if decoded != task {
            return Err(format!("Decoded {:?}, expected {:?}", decoded, task));
        }
        Ok(())
    }

    #[test]
    fn timeout_failure_keeps_its_duration() -> Result<(), String> {
        let result = ExecutionResult::failure(
            3,
            TaskError::Timeout {
                after: Duration::from_millis(250),
            },
            Duration::from_millis(251),
        );
        let decoded = ExecutionResult::from(WireResult::from(result.clone()));
        if decoded != result {
            return Err(format!("Decoded {:?}, expected {:?}", decoded, result));
        }
        Ok(())
    }

    #[test]
    fn unknown_category_is_rejected() -> Result<(), String> {
        let wire = WireTask {
            index: 0,
            input: WireInput::Fetch {
                category: "albums".to_owned(),
                id: 1,
            },
        };
        match Task::try_from(wire) {
            Err(message) if message.contains("albums") => Ok(()),
            other => Err(format!("Expected rejection, got {:?}", other)),
        }
    }

    #[test]
    fn read_message_reports_closed_channel() -> Result<(), String> {
        let mut reader = Cursor::new(Vec::<u8>::new());
        match read_message::<_, Reply>(&mut reader) {
            Err(FrameError::Closed) => Ok(()),
            other => Err(format!("Expected closed channel, got {:?}", other)),
        }
    }
}
