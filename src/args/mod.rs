//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

pub use cli::{BenchArgs, Command, CompareArgs, SweepArgs, WorkloadArgs};
pub use types::{OutputFormat, PositiveU64, PositiveUsize, ProbeKind, ShapeKind, StrategyKind};

pub(crate) use parsers::{parse_base_url, parse_duration_arg};
