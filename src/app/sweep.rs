use std::sync::Arc;

use tracing::info;

use crate::args::SweepArgs;
use crate::error::{AppError, AppResult, ValidationError};
use crate::report::ReportComparator;
use crate::strategy;

use super::output::{ReportContext, print_report};
use super::prepare;

pub(crate) fn run_sweep(args: &SweepArgs) -> AppResult<()> {
    let worker_counts = args.resolved_worker_counts();
    if worker_counts.is_empty() {
        return Err(AppError::validation(ValidationError::EmptyWorkerCounts));
    }
    let bench = prepare(&args.workload)?;

    let baseline = strategy::build(args.resolved_baseline(), Arc::clone(&bench.collaborator))?;
    let candidate = strategy::build(args.resolved_candidate(), Arc::clone(&bench.collaborator))?;
    info!(
        "Sweeping {} over {:?} workers against {}",
        candidate.name(),
        worker_counts.iter().map(|count| count.get()).collect::<Vec<_>>(),
        baseline.name()
    );

    let sweep = bench.runner.sweep(
        baseline.as_ref(),
        candidate.as_ref(),
        &bench.tasks,
        &worker_counts,
    );

    let report = ReportComparator::default().compare(&sweep.baseline, &sweep.candidates);
    let context = ReportContext {
        command: "sweep",
        shape: args.workload.shape,
        task_count: bench.tasks.len(),
        probe: bench.probe_name,
    };
    print_report(&report, &context, args.workload.output_format)
}
