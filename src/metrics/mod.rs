//! Run measurement: wall time, peak memory, and latency summaries.
mod collector;
mod histogram;
mod types;


pub use collector::MetricsCollector;
pub use histogram::LatencyHistogram;
pub use types::{LatencySummary, RunMetrics, SampleInfo};
