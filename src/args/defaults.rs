use super::types::{ShapeKind, StrategyKind};

pub(crate) const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Worker counts swept for I/O workloads when none are given.
const IO_WORKER_COUNTS: [usize; 4] = [50, 100, 200, 1000];
/// Worker counts swept for CPU workloads when none are given.
const CPU_WORKER_COUNTS: [usize; 4] = [1, 2, 4, 8];

pub(crate) const fn default_sweep_baseline(shape: ShapeKind) -> StrategyKind {
    match shape {
        ShapeKind::Io => StrategyKind::EventLoop,
        ShapeKind::Cpu => StrategyKind::Sequential,
    }
}

pub(crate) const fn default_sweep_candidate(shape: ShapeKind) -> StrategyKind {
    match shape {
        ShapeKind::Io => StrategyKind::ThreadPool,
        ShapeKind::Cpu => StrategyKind::ProcessPool,
    }
}

pub(crate) fn default_compare_strategies(shape: ShapeKind) -> Vec<StrategyKind> {
    match shape {
        ShapeKind::Io => vec![StrategyKind::EventLoop, StrategyKind::ThreadPool],
        ShapeKind::Cpu => vec![StrategyKind::ThreadPool, StrategyKind::ProcessPool],
    }
}

pub(crate) const fn default_worker_counts(shape: ShapeKind) -> &'static [usize] {
    match shape {
        ShapeKind::Io => &IO_WORKER_COUNTS,
        ShapeKind::Cpu => &CPU_WORKER_COUNTS,
    }
}

pub(crate) fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}
