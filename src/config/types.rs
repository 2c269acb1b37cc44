use std::time::Duration;

use serde::Deserialize;

use crate::args::{OutputFormat, ProbeKind, ShapeKind, StrategyKind, parse_duration_arg};
use crate::error::AppResult;

/// Values accepted from `stratbench.toml` / `stratbench.json`.
///
/// Every field is optional; command-line values win.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(alias = "tasks")]
    pub task_count: Option<usize>,
    pub worker_counts: Option<Vec<usize>>,
    #[serde(alias = "shape")]
    pub workload_shape: Option<ShapeKind>,
    pub complexity_base: Option<u64>,
    pub complexity_step: Option<u64>,
    pub base_url: Option<String>,
    #[serde(alias = "timeout")]
    pub task_timeout: Option<DurationValue>,
    pub baseline: Option<StrategyKind>,
    pub baseline_sample: Option<usize>,
    pub candidate: Option<StrategyKind>,
    pub strategies: Option<Vec<StrategyKind>>,
    pub workers: Option<usize>,
    #[serde(alias = "probe")]
    pub memory_probe: Option<ProbeKind>,
    pub output_format: Option<OutputFormat>,
    pub no_color: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> AppResult<Duration> {
        match self {
            DurationValue::Seconds(secs) => parse_duration_arg(&format!("{}s", secs)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
