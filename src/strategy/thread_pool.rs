use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use tracing::debug;

use crate::collab::Collaborator;
use crate::error::StrategyError;
use crate::runner::{ExecutionResult, TaskRunner};
use crate::workload::Task;

use super::{ExecutionStrategy, StrategyConfig, ensure_complete};

/// `worker_count` OS threads pulling from one shared queue.
///
/// Threads run with OS preemption and, for native collaborators, in
/// parallel. Results are collected in completion order.
pub struct ThreadPool {
    collaborator: Arc<dyn Collaborator>,
}

impl ThreadPool {
    #[must_use]
    pub fn new(collaborator: Arc<dyn Collaborator>) -> Self {
        Self { collaborator }
    }
}

impl ExecutionStrategy for ThreadPool {
    fn name(&self) -> &'static str {
        "thread-pool"
    }

    fn run(
        &self,
        tasks: &[Task],
        config: &StrategyConfig,
    ) -> Result<Vec<ExecutionResult>, StrategyError> {
        if tasks.is_empty() {
            return Ok(Vec::new());
        }
        // Idle threads beyond the task count would never pick up work.
        let thread_count = config.worker_count.get().min(tasks.len());
        let runner = TaskRunner::new(Arc::clone(&self.collaborator), config.task_timeout);
        let queue: Mutex<VecDeque<&Task>> = Mutex::new(tasks.iter().collect());
        let cancelled = AtomicBool::new(false);
        let (result_tx, result_rx) = mpsc::channel();

        debug!(
            "Starting {} pool threads for {} tasks",
            thread_count,
            tasks.len()
        );
        thread::scope(|scope| {
            let runner = &runner;
            let queue = &queue;
            let cancelled = &cancelled;
            for index in 0..thread_count {
                let result_tx = result_tx.clone();
                let spawned = thread::Builder::new()
                    .name(format!("pool-worker-{}", index))
                    .spawn_scoped(scope, move || {
                        drain_queue(runner, queue, cancelled, &result_tx);
                    });
                if let Err(source) = spawned {
                    cancelled.store(true, Ordering::Release);
                    return Err(StrategyError::SpawnWorker { index, source });
                }
            }
            Ok(())
        })?;
        drop(result_tx);

        let results: Vec<ExecutionResult> = result_rx.into_iter().collect();
        ensure_complete(tasks.len(), results.len())?;
        Ok(results)
    }
}

fn drain_queue(
    runner: &TaskRunner,
    queue: &Mutex<VecDeque<&Task>>,
    cancelled: &AtomicBool,
    results: &Sender<ExecutionResult>,
) {
    while !cancelled.load(Ordering::Acquire) {
        let next = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let Some(task) = next else {
            break;
        };
        if results.send(runner.invoke(task)).is_err() {
            break;
        }
    }
}
