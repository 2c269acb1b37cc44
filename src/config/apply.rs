mod util;

use clap::ArgMatches;

use crate::args::{BenchArgs, Command, CompareArgs, SweepArgs, WorkloadArgs, parse_base_url};
use crate::error::AppResult;

use super::types::ConfigFile;
use util::{ensure_positive_u64, ensure_positive_usize, is_cli};

/// Applies configuration values to CLI arguments.
///
/// Only options that were not given on the command line are taken from the
/// file.
///
/// # Errors
///
/// Returns an error when config values are invalid.
pub fn apply_config(
    args: &mut BenchArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "no_color")
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    let sub_matches = matches.subcommand().map(|(_, sub_matches)| sub_matches);
    match (&mut args.command, sub_matches) {
        (Command::Compare(compare), Some(sub_matches)) => {
            apply_workload(&mut compare.workload, sub_matches, config)?;
            apply_compare(compare, sub_matches, config)
        }
        (Command::Sweep(sweep), Some(sub_matches)) => {
            apply_workload(&mut sweep.workload, sub_matches, config)?;
            apply_sweep(sweep, sub_matches, config)
        }
        (Command::Compare(_) | Command::Sweep(_), None) | (Command::Worker, _) => Ok(()),
    }
}

fn apply_workload(
    workload: &mut WorkloadArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "task_count")
        && let Some(count) = config.task_count
    {
        workload.task_count = ensure_positive_usize(count, "task_count")?;
    }

    if !is_cli(matches, "shape")
        && let Some(shape) = config.workload_shape
    {
        workload.shape = shape;
    }

    if !is_cli(matches, "base_url")
        && let Some(base_url) = config.base_url.as_deref()
    {
        workload.base_url = parse_base_url(base_url)?;
    }

    if !is_cli(matches, "complexity_base")
        && let Some(base) = config.complexity_base
    {
        workload.complexity_base = base;
    }

    if !is_cli(matches, "complexity_step")
        && let Some(step) = config.complexity_step
    {
        workload.complexity_step = ensure_positive_u64(step, "complexity_step")?;
    }

    if !is_cli(matches, "task_timeout")
        && let Some(timeout) = config.task_timeout.as_ref()
    {
        workload.task_timeout = Some(timeout.to_duration()?);
    }

    if !is_cli(matches, "baseline")
        && let Some(baseline) = config.baseline
    {
        workload.baseline = Some(baseline);
    }

    if !is_cli(matches, "baseline_sample")
        && let Some(sample) = config.baseline_sample
    {
        workload.baseline_sample = Some(ensure_positive_usize(sample, "baseline_sample")?);
    }

    if !is_cli(matches, "probe")
        && let Some(probe) = config.memory_probe
    {
        workload.probe = probe;
    }

    if !is_cli(matches, "output_format")
        && let Some(format) = config.output_format
    {
        workload.output_format = format;
    }

    Ok(())
}

fn apply_compare(
    compare: &mut CompareArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "strategies")
        && let Some(strategies) = config.strategies.as_ref()
    {
        compare.strategies.clone_from(strategies);
    }

    if !is_cli(matches, "workers")
        && let Some(workers) = config.workers
    {
        compare.workers = Some(ensure_positive_usize(workers, "workers")?);
    }

    Ok(())
}

fn apply_sweep(sweep: &mut SweepArgs, matches: &ArgMatches, config: &ConfigFile) -> AppResult<()> {
    if !is_cli(matches, "candidate")
        && let Some(candidate) = config.candidate
    {
        sweep.candidate = Some(candidate);
    }

    if !is_cli(matches, "worker_counts")
        && let Some(worker_counts) = config.worker_counts.as_ref()
    {
        sweep.worker_counts = worker_counts
            .iter()
            .map(|count| ensure_positive_usize(*count, "worker_counts"))
            .collect::<AppResult<Vec<_>>>()?;
    }

    Ok(())
}
