mod compare;
mod output;
mod sweep;

use std::sync::Arc;

use tracing::info;

use crate::args::{ShapeKind, WorkloadArgs};
use crate::collab::{Collaborator, HttpFetcher, PrimeCounter};
use crate::error::{AppError, AppResult, ValidationError};
use crate::metrics::MetricsCollector;
use crate::probe;
use crate::sweep::ScalingSweepRunner;
use crate::workload::{Task, WorkloadShape, generate};

pub(crate) use compare::run_compare;
pub(crate) use sweep::run_sweep;

/// Everything one benchmark command shares across its runs.
struct Bench {
    tasks: Vec<Task>,
    collaborator: Arc<dyn Collaborator>,
    runner: ScalingSweepRunner,
    probe_name: &'static str,
}

fn prepare(workload: &WorkloadArgs) -> AppResult<Bench> {
    let task_count = workload.task_count.get();
    if let Some(sample) = workload.baseline_sample
        && sample.get() > task_count
    {
        return Err(AppError::validation(ValidationError::SampleExceedsTasks {
            sample: sample.get(),
            tasks: task_count,
        }));
    }

    let (shape, collaborator): (WorkloadShape, Arc<dyn Collaborator>) = match workload.shape {
        ShapeKind::Io => (
            WorkloadShape::Io,
            Arc::new(HttpFetcher::new(&workload.base_url)?),
        ),
        ShapeKind::Cpu => (
            WorkloadShape::Cpu {
                base_complexity: workload.complexity_base,
                step: workload.complexity_step.get(),
            },
            Arc::new(PrimeCounter),
        ),
    };
    let tasks = generate(task_count, shape)?;

    let probe = probe::build(workload.probe);
    let probe_name = probe.name();
    let collector = MetricsCollector::new(probe);
    let runner = ScalingSweepRunner::new(collector, workload.task_timeout)
        .with_baseline_sample(workload.baseline_sample);

    info!(
        "Prepared {} {} tasks for collaborator {} (probe {})",
        tasks.len(),
        workload.shape.as_str(),
        collaborator.name(),
        probe_name
    );

    Ok(Bench {
        tasks,
        collaborator,
        runner,
        probe_name,
    })
}
