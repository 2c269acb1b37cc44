use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use super::defaults::{
    DEFAULT_BASE_URL, available_workers, default_compare_strategies, default_sweep_baseline,
    default_sweep_candidate, default_worker_counts,
};
use super::parsers::{
    parse_base_url, parse_duration_arg, parse_positive_u64, parse_positive_usize,
};
use super::types::{
    OutputFormat, PositiveU64, PositiveUsize, ProbeKind, ShapeKind, StrategyKind,
};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Benchmark sequential, event-loop, thread-pool, and process-pool execution of I/O- and CPU-bound workloads."
)]
pub struct BenchArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (sets log level to debug unless overridden by STRATBENCH_LOG/RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to config file (TOML/JSON). Falls back to $STRATBENCH_CONFIG, then ./stratbench.toml or ./stratbench.json.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run several strategies at one worker count and compare them against a baseline
    Compare(CompareArgs),
    /// Run a candidate strategy across worker counts and compare against a baseline
    Sweep(SweepArgs),
    /// Serve process-pool tasks over stdin/stdout
    #[command(hide = true)]
    Worker,
}

#[derive(Debug, Args, Clone)]
pub struct WorkloadArgs {
    /// Number of tasks to generate
    #[arg(long = "tasks", short = 'n', default_value = "200", value_parser = parse_positive_usize)]
    pub task_count: PositiveUsize,

    /// Workload shape
    #[arg(long = "shape", value_enum, default_value = "io")]
    pub shape: ShapeKind,

    /// Base URL for I/O tasks
    #[arg(long = "base-url", default_value = DEFAULT_BASE_URL, value_parser = parse_base_url)]
    pub base_url: String,

    /// Upper bound of the first CPU task's prime count
    #[arg(long = "complexity-base", default_value = "50000")]
    pub complexity_base: u64,

    /// Increase of the prime-count bound per CPU task
    #[arg(long = "complexity-step", default_value = "1000", value_parser = parse_positive_u64)]
    pub complexity_step: PositiveU64,

    /// Per-task timeout (supports ms/s/m/h)
    #[arg(long = "timeout", value_parser = parse_duration_arg)]
    pub task_timeout: Option<Duration>,

    /// Baseline strategy
    #[arg(long = "baseline", value_enum)]
    pub baseline: Option<StrategyKind>,

    /// Run the baseline on the first N tasks only and project its wall time
    #[arg(long = "baseline-sample", value_parser = parse_positive_usize)]
    pub baseline_sample: Option<PositiveUsize>,

    /// Memory probe used around each run
    #[arg(long = "probe", value_enum, default_value = "alloc")]
    pub probe: ProbeKind,

    /// Report format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct CompareArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Strategies to compare (comma separated)
    #[arg(long = "strategies", value_enum, value_delimiter = ',')]
    pub strategies: Vec<StrategyKind>,

    /// Worker count for pooled strategies (defaults to available CPUs)
    #[arg(long = "workers", short = 'w', value_parser = parse_positive_usize)]
    pub workers: Option<PositiveUsize>,
}

impl CompareArgs {
    #[must_use]
    pub fn resolved_baseline(&self) -> StrategyKind {
        self.workload.baseline.unwrap_or(StrategyKind::Sequential)
    }

    #[must_use]
    pub fn resolved_strategies(&self) -> Vec<StrategyKind> {
        if self.strategies.is_empty() {
            return default_compare_strategies(self.workload.shape);
        }
        self.strategies.clone()
    }

    #[must_use]
    pub fn resolved_workers(&self) -> PositiveUsize {
        self.workers
            .or_else(|| PositiveUsize::try_from(available_workers()).ok())
            .unwrap_or(PositiveUsize::ONE)
    }
}

#[derive(Debug, Args, Clone)]
pub struct SweepArgs {
    #[command(flatten)]
    pub workload: WorkloadArgs,

    /// Strategy swept across worker counts
    #[arg(long = "candidate", value_enum)]
    pub candidate: Option<StrategyKind>,

    /// Worker counts to sweep (comma separated)
    #[arg(long = "worker-counts", value_delimiter = ',', value_parser = parse_positive_usize)]
    pub worker_counts: Vec<PositiveUsize>,
}

impl SweepArgs {
    #[must_use]
    pub fn resolved_baseline(&self) -> StrategyKind {
        self.workload
            .baseline
            .unwrap_or_else(|| default_sweep_baseline(self.workload.shape))
    }

    #[must_use]
    pub fn resolved_candidate(&self) -> StrategyKind {
        self.candidate
            .unwrap_or_else(|| default_sweep_candidate(self.workload.shape))
    }

    #[must_use]
    pub fn resolved_worker_counts(&self) -> Vec<PositiveUsize> {
        if !self.worker_counts.is_empty() {
            return self.worker_counts.clone();
        }
        default_worker_counts(self.workload.shape)
            .iter()
            .filter_map(|count| PositiveUsize::try_from(*count).ok())
            .collect()
    }
}
