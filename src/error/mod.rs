mod app;
mod config;
mod strategy;
mod task;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use strategy::{FrameError, StrategyError};
pub use task::TaskError;
pub use validation::ValidationError;
