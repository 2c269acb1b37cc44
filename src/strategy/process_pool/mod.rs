//! `worker_count` child processes fed over stdin/stdout.
//!
//! Each child is this executable re-run with the hidden `worker`
//! subcommand. Tasks and results cross the boundary as newline-delimited
//! JSON; nothing else is shared. Collaborators must describe themselves
//! with a [`CollaboratorSpec`] so children can rebuild them.
mod wire;
mod worker;

use std::collections::VecDeque;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::collab::{Collaborator, CollaboratorSpec};
use crate::error::{FrameError, StrategyError, TaskError};
use crate::runner::ExecutionResult;
use crate::workload::Task;

use super::{ExecutionStrategy, StrategyConfig, ensure_complete};
use wire::{Reply, Request, WireTask, duration_to_us, read_message, send_message};

pub use worker::run_worker;

/// Program and arguments that start one worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl WorkerCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Re-runs the current executable as a worker.
    ///
    /// # Errors
    ///
    /// Returns an error when the current executable path cannot be read.
    pub fn current_exe() -> Result<Self, StrategyError> {
        let program =
            std::env::current_exe().map_err(|source| StrategyError::ResolveExecutable { source })?;
        Ok(Self::new(program, vec!["worker".to_owned()]))
    }

    fn spawn(&self) -> std::io::Result<Child> {
        Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
    }
}

pub struct ProcessPool {
    collaborator: Arc<dyn Collaborator>,
    command: WorkerCommand,
}

impl ProcessPool {
    #[must_use]
    pub fn new(collaborator: Arc<dyn Collaborator>, command: WorkerCommand) -> Self {
        Self {
            collaborator,
            command,
        }
    }
}

impl ExecutionStrategy for ProcessPool {
    fn name(&self) -> &'static str {
        "process-pool"
    }

    fn run(
        &self,
        tasks: &[Task],
        config: &StrategyConfig,
    ) -> Result<Vec<ExecutionResult>, StrategyError> {
        let spec = self
            .collaborator
            .remote_spec()
            .ok_or(StrategyError::NotTransferable {
                name: self.collaborator.name(),
            })?;
        if tasks.is_empty() {
            return Ok(Vec::new());
        }
        let process_count = config.worker_count.get().min(tasks.len());

        let mut workers = Vec::with_capacity(process_count);
        for index in 0..process_count {
            let mut worker = WorkerProcess::spawn(index, &self.command)?;
            worker.configure(&spec, config.task_timeout)?;
            workers.push(worker);
        }
        debug!(
            "Started {} worker processes for {} tasks",
            workers.len(),
            tasks.len()
        );

        let queue: Mutex<VecDeque<&Task>> = Mutex::new(tasks.iter().collect());
        let (result_tx, result_rx) = mpsc::channel();
        thread::scope(|scope| {
            let queue = &queue;
            for worker in &mut workers {
                let index = worker.index;
                let result_tx = result_tx.clone();
                thread::Builder::new()
                    .name(format!("pool-driver-{}", index))
                    .spawn_scoped(scope, move || drive(worker, queue, &result_tx))
                    .map_err(|source| StrategyError::SpawnWorker { index, source })?;
            }
            Ok::<_, StrategyError>(())
        })?;
        drop(result_tx);

        let mut results: Vec<ExecutionResult> = result_rx.into_iter().collect();
        let stranded = queue.into_inner().unwrap_or_else(PoisonError::into_inner);
        if !stranded.is_empty() {
            warn!("{} tasks stranded after every worker was lost", stranded.len());
        }
        results.extend(stranded.into_iter().map(|task| {
            ExecutionResult::failure(
                task.index(),
                TaskError::WorkerLost {
                    message: "No live worker remained".to_owned(),
                },
                Duration::ZERO,
            )
        }));

        for worker in workers {
            worker.shutdown();
        }
        ensure_complete(tasks.len(), results.len())?;
        Ok(results)
    }
}

fn drive(
    worker: &mut WorkerProcess,
    queue: &Mutex<VecDeque<&Task>>,
    results: &Sender<ExecutionResult>,
) {
    loop {
        let next = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let Some(task) = next else {
            return;
        };
        let started = Instant::now();
        let result = match worker.execute(task) {
            Ok(result) => result,
            Err(err) => {
                warn!("Lost worker {}: {}", worker.index, err);
                worker.lost = true;
                ExecutionResult::failure(
                    task.index(),
                    TaskError::WorkerLost {
                        message: err.to_string(),
                    },
                    started.elapsed(),
                )
            }
        };
        if results.send(result).is_err() || worker.lost {
            return;
        }
    }
}

struct WorkerProcess {
    index: usize,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    lost: bool,
    released: bool,
}

impl WorkerProcess {
    fn spawn(index: usize, command: &WorkerCommand) -> Result<Self, StrategyError> {
        let mut child = command
            .spawn()
            .map_err(|source| StrategyError::SpawnWorker { index, source })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            reap(index, &mut child);
            return Err(StrategyError::Handshake {
                index,
                message: "worker pipes unavailable".to_owned(),
            });
        };
        Ok(Self {
            index,
            child,
            stdin,
            stdout: BufReader::new(stdout),
            lost: false,
            released: false,
        })
    }

    fn configure(
        &mut self,
        spec: &CollaboratorSpec,
        timeout: Option<Duration>,
    ) -> Result<(), StrategyError> {
        let request = Request::Configure {
            collaborator: spec.clone(),
            timeout_us: timeout.map(duration_to_us),
        };
        self.send(&request, "configure")?;
        match self.receive("await ready")? {
            Reply::Ready { pid } => {
                debug!("Worker {} ready as pid {}", self.index, pid);
                Ok(())
            }
            Reply::Failed { message } => Err(StrategyError::Handshake {
                index: self.index,
                message,
            }),
            Reply::Result { .. } => Err(StrategyError::Handshake {
                index: self.index,
                message: "unexpected result before ready".to_owned(),
            }),
        }
    }

    fn execute(&mut self, task: &Task) -> Result<ExecutionResult, StrategyError> {
        self.send(
            &Request::Run {
                task: WireTask::from(task),
            },
            "send task",
        )?;
        match self.receive("await result")? {
            Reply::Result { result } => Ok(ExecutionResult::from(result)),
            Reply::Failed { message } => Err(StrategyError::Handshake {
                index: self.index,
                message,
            }),
            Reply::Ready { .. } => Err(StrategyError::Handshake {
                index: self.index,
                message: "unexpected ready while awaiting result".to_owned(),
            }),
        }
    }

    fn send(&mut self, request: &Request, context: &'static str) -> Result<(), StrategyError> {
        let index = self.index;
        send_message(&mut self.stdin, request).map_err(|source| frame_error(index, context, source))
    }

    fn receive(&mut self, context: &'static str) -> Result<Reply, StrategyError> {
        let index = self.index;
        read_message(&mut self.stdout).map_err(|source| frame_error(index, context, source))
    }

    fn shutdown(mut self) {
        if self.lost {
            return;
        }
        match self.send(&Request::Shutdown, "shutdown") {
            Ok(()) => self.released = true,
            Err(err) => debug!("Worker {} shutdown request failed: {}", self.index, err),
        }
    }
}

fn frame_error(index: usize, context: &'static str, source: FrameError) -> StrategyError {
    StrategyError::WorkerFrame {
        index,
        context,
        source,
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        // A child that was not told to shut down is still blocked on stdin.
        if self.released {
            if let Err(err) = self.child.wait() {
                warn!("Failed to reap worker {}: {}", self.index, err);
            }
        } else {
            reap(self.index, &mut self.child);
        }
    }
}

fn reap(index: usize, child: &mut Child) {
    if let Err(err) = child.kill() {
        debug!("Worker {} already exited: {}", index, err);
    }
    if let Err(err) = child.wait() {
        warn!("Failed to reap worker {}: {}", index, err);
    }
}
