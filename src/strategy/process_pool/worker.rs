use std::io::{self, BufRead, Write};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{FrameError, StrategyError};
use crate::runner::TaskRunner;
use crate::workload::Task;

use super::wire::{Reply, Request, WireResult, read_message, send_message};

/// Serves process-pool requests on stdin/stdout until shut down.
///
/// # Errors
///
/// Returns an error when the channel to the parent breaks or the requested
/// collaborator cannot be built.
pub fn run_worker() -> Result<(), StrategyError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(&mut stdin.lock(), &mut stdout.lock())
}

pub(super) fn serve<R, W>(reader: &mut R, writer: &mut W) -> Result<(), StrategyError>
where
    R: BufRead,
    W: Write,
{
    let mut runner: Option<TaskRunner> = None;
    loop {
        let request = match read_message::<_, Request>(reader) {
            Ok(request) => request,
            Err(FrameError::Closed) => {
                debug!("Parent closed the worker channel");
                return Ok(());
            }
            Err(source) => {
                return Err(StrategyError::Channel {
                    context: "read request",
                    source,
                });
            }
        };
        let reply = match request {
            Request::Configure {
                collaborator,
                timeout_us,
            } => match collaborator.build() {
                Ok(built) => {
                    debug!("Worker {} serving {}", std::process::id(), built.name());
                    runner = Some(TaskRunner::new(
                        built,
                        timeout_us.map(Duration::from_micros),
                    ));
                    Reply::Ready {
                        pid: std::process::id(),
                    }
                }
                Err(err) => {
                    warn!("Worker failed to build collaborator: {}", err);
                    Reply::Failed {
                        message: err.to_string(),
                    }
                }
            },
            Request::Run { task } => match (runner.as_ref(), Task::try_from(task)) {
                (Some(runner), Ok(task)) => Reply::Result {
                    result: WireResult::from(runner.invoke(&task)),
                },
                (None, _) => Reply::Failed {
                    message: "Worker received a task before configuration".to_owned(),
                },
                (Some(_), Err(message)) => Reply::Failed { message },
            },
            Request::Shutdown => return Ok(()),
        };
        send_message(writer, &reply).map_err(|source| StrategyError::Channel {
            context: "send reply",
            source,
        })?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::CollaboratorSpec;
    use crate::strategy::process_pool::wire::{WireInput, WireOutcome, WireTask};
    use std::io::Cursor;

    fn encode(requests: &[Request]) -> Result<Vec<u8>, String> {
        let mut buffer = Vec::new();
        for request in requests {
            send_message(&mut buffer, request).map_err(|err| err.to_string())?;
        }
        Ok(buffer)
    }

    fn decode(output: Vec<u8>) -> Result<Vec<Reply>, String> {
        let mut reader = Cursor::new(output);
        let mut replies = Vec::new();
        loop {
            match read_message::<_, Reply>(&mut reader) {
                Ok(reply) => replies.push(reply),
                Err(FrameError::Closed) => return Ok(replies),
                Err(err) => return Err(err.to_string()),
            }
        }
    }

    #[test]
    fn worker_serves_configured_tasks() -> Result<(), String> {
        let input = encode(&[
            Request::Configure {
                collaborator: CollaboratorSpec::Primes,
                timeout_us: None,
            },
            Request::Run {
                task: WireTask {
                    index: 5,
                    input: WireInput::Compute { bound: 100 },
                },
            },
            Request::Shutdown,
        ])?;
        let mut output = Vec::new();
        serve(&mut Cursor::new(input), &mut output).map_err(|err| err.to_string())?;
        let replies = decode(output)?;
        match replies.as_slice() {
            [
                Reply::Ready { .. },
                Reply::Result {
                    result:
                        WireResult {
                            task_index: 5,
                            outcome:
                                WireOutcome::Primes {
                                    range: 100,
                                    prime_count: 25,
                                },
                            ..
                        },
                },
            ] => Ok(()),
            other => Err(format!("Unexpected replies: {:?}", other)),
        }
    }

    #[test]
    fn worker_rejects_tasks_before_configuration() -> Result<(), String> {
        let input = encode(&[Request::Run {
            task: WireTask {
                index: 0,
                input: WireInput::Compute { bound: 10 },
            },
        }])?;
        let mut output = Vec::new();
        serve(&mut Cursor::new(input), &mut output).map_err(|err| err.to_string())?;
        match decode(output)?.as_slice() {
            [Reply::Failed { .. }] => Ok(()),
            other => Err(format!("Unexpected replies: {:?}", other)),
        }
    }

    #[test]
    fn worker_exits_when_channel_closes() -> Result<(), String> {
        let mut output = Vec::new();
        serve(&mut Cursor::new(Vec::<u8>::new()), &mut output).map_err(|err| err.to_string())?;
        if !output.is_empty() {
            return Err("Expected no replies".to_owned());
        }
        Ok(())
    }
}
