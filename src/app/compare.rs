use std::sync::Arc;

use tracing::{info, warn};

use crate::args::CompareArgs;
use crate::error::{AppError, AppResult, ValidationError};
use crate::report::ReportComparator;
use crate::runner::results_match;
use crate::strategy;

use super::output::{ReportContext, print_report};
use super::prepare;

pub(crate) fn run_compare(args: &CompareArgs) -> AppResult<()> {
    let strategies = args.resolved_strategies();
    if strategies.is_empty() {
        return Err(AppError::validation(ValidationError::EmptyStrategies));
    }
    let bench = prepare(&args.workload)?;
    let workers = args.resolved_workers();

    let baseline = strategy::build(args.resolved_baseline(), Arc::clone(&bench.collaborator))?;
    info!("Running baseline {}", baseline.name());
    let baseline_run = bench.runner.run_baseline(baseline.as_ref(), &bench.tasks);
    // A sampled baseline saw only a prefix of the tasks.
    let oracle = (baseline_run.metrics.sample.is_none() && !baseline_run.metrics.is_failed())
        .then_some(&baseline_run.results);

    let mut candidates = Vec::with_capacity(strategies.len());
    for kind in strategies {
        let candidate = strategy::build(kind, Arc::clone(&bench.collaborator))?;
        info!(
            "Running {} with {} workers",
            candidate.name(),
            workers.get()
        );
        let measured = bench
            .runner
            .run_candidate(candidate.as_ref(), &bench.tasks, workers);
        if let Some(expected) = oracle
            && !measured.metrics.is_failed()
            && !results_match(expected, &measured.results)
        {
            warn!(
                "{} results differ from baseline {}",
                candidate.name(),
                baseline.name()
            );
        }
        candidates.push(measured.metrics);
    }

    let report = ReportComparator::default().compare(&baseline_run.metrics, &candidates);
    let context = ReportContext {
        command: "compare",
        shape: args.workload.shape,
        task_count: bench.tasks.len(),
        probe: bench.probe_name,
    };
    print_report(&report, &context, args.workload.output_format)
}
