use super::test_support::parse_test_args;
use super::*;
use crate::error::{AppError, AppResult};
use std::time::Duration;

fn compare_args(args: BenchArgs) -> AppResult<CompareArgs> {
    match args.command {
        Command::Compare(compare) => Ok(compare),
        Command::Sweep(_) | Command::Worker => {
            Err(AppError::validation("Expected compare subcommand"))
        }
    }
}

fn sweep_args(args: BenchArgs) -> AppResult<SweepArgs> {
    match args.command {
        Command::Sweep(sweep) => Ok(sweep),
        Command::Compare(_) | Command::Worker => {
            Err(AppError::validation("Expected sweep subcommand"))
        }
    }
}

#[test]
fn parse_compare_defaults() -> AppResult<()> {
    let compare = compare_args(parse_test_args(["stratbench", "compare"])?)?;
    if compare.workload.task_count.get() != 200 {
        return Err(AppError::validation("Unexpected default task count"));
    }
    if compare.workload.shape != ShapeKind::Io {
        return Err(AppError::validation("Expected io shape"));
    }
    if compare.workload.base_url != "https://jsonplaceholder.typicode.com" {
        return Err(AppError::validation("Unexpected default base url"));
    }
    if compare.resolved_baseline() != StrategyKind::Sequential {
        return Err(AppError::validation("Expected sequential baseline"));
    }
    if compare.resolved_strategies() != vec![StrategyKind::EventLoop, StrategyKind::ThreadPool] {
        return Err(AppError::validation("Unexpected default io strategies"));
    }
    if compare.workload.task_timeout.is_some() {
        return Err(AppError::validation("Expected no timeout by default"));
    }
    Ok(())
}

#[test]
fn parse_compare_strategy_list_and_aliases() -> AppResult<()> {
    let compare = compare_args(parse_test_args([
        "stratbench",
        "compare",
        "--shape",
        "cpu",
        "--strategies",
        "sync,threads,process-pool",
        "--workers",
        "4",
        "--timeout",
        "250ms",
    ])?)?;
    if compare.resolved_strategies()
        != vec![
            StrategyKind::Sequential,
            StrategyKind::ThreadPool,
            StrategyKind::ProcessPool,
        ]
    {
        return Err(AppError::validation("Unexpected strategy list"));
    }
    if compare.resolved_workers().get() != 4 {
        return Err(AppError::validation("Unexpected worker count"));
    }
    if compare.workload.task_timeout != Some(Duration::from_millis(250)) {
        return Err(AppError::validation("Unexpected timeout"));
    }
    Ok(())
}

#[test]
fn parse_sweep_defaults_follow_shape() -> AppResult<()> {
    let io = sweep_args(parse_test_args(["stratbench", "sweep"])?)?;
    let io_counts: Vec<usize> = io
        .resolved_worker_counts()
        .into_iter()
        .map(PositiveUsize::get)
        .collect();
    if io_counts != vec![50, 100, 200, 1000] {
        return Err(AppError::validation(format!(
            "Unexpected io worker counts: {:?}",
            io_counts
        )));
    }
    if io.resolved_baseline() != StrategyKind::EventLoop
        || io.resolved_candidate() != StrategyKind::ThreadPool
    {
        return Err(AppError::validation("Unexpected io sweep strategies"));
    }

    let cpu = sweep_args(parse_test_args(["stratbench", "sweep", "--shape", "cpu"])?)?;
    if cpu.resolved_baseline() != StrategyKind::Sequential
        || cpu.resolved_candidate() != StrategyKind::ProcessPool
    {
        return Err(AppError::validation("Unexpected cpu sweep strategies"));
    }
    Ok(())
}

#[test]
fn parse_sweep_worker_counts() -> AppResult<()> {
    let sweep = sweep_args(parse_test_args([
        "stratbench",
        "sweep",
        "--worker-counts",
        "1,2,4,8",
        "--candidate",
        "thread-pool",
    ])?)?;
    let counts: Vec<usize> = sweep
        .resolved_worker_counts()
        .into_iter()
        .map(PositiveUsize::get)
        .collect();
    if counts != vec![1, 2, 4, 8] {
        return Err(AppError::validation("Unexpected worker counts"));
    }
    Ok(())
}

#[test]
fn parse_rejects_zero_worker_count() -> AppResult<()> {
    match parse_test_args(["stratbench", "sweep", "--worker-counts", "1,0"]) {
        Ok(_) => Err(AppError::validation("Expected zero worker count to fail")),
        Err(_) => Ok(()),
    }
}

#[test]
fn parse_rejects_zero_tasks() -> AppResult<()> {
    match parse_test_args(["stratbench", "compare", "--tasks", "0"]) {
        Ok(_) => Err(AppError::validation("Expected zero task count to fail")),
        Err(_) => Ok(()),
    }
}

#[test]
fn parse_worker_subcommand_is_hidden_but_accepted() -> AppResult<()> {
    let args = parse_test_args(["stratbench", "worker"])?;
    if !matches!(args.command, Command::Worker) {
        return Err(AppError::validation("Expected worker subcommand"));
    }
    Ok(())
}

#[test]
fn parse_base_url_trims_trailing_slash() -> AppResult<()> {
    let value = parse_base_url("http://127.0.0.1:8080/")?;
    if value != "http://127.0.0.1:8080" {
        return Err(AppError::validation(format!("Unexpected url: {}", value)));
    }
    if parse_base_url("ftp://example.com").is_ok() {
        return Err(AppError::validation("Expected non-http url to fail"));
    }
    Ok(())
}

#[test]
fn parse_duration_units() -> AppResult<()> {
    let cases = [
        ("5", Duration::from_secs(5)),
        ("150ms", Duration::from_millis(150)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_arg(input)?;
        if parsed != expected {
            return Err(AppError::validation(format!(
                "Unexpected duration for {}: {:?}",
                input, parsed
            )));
        }
    }
    if parse_duration_arg("0s").is_ok() {
        return Err(AppError::validation("Expected zero duration to fail"));
    }
    Ok(())
}
