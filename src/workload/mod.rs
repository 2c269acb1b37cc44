//! Deterministic task generation.
mod generator;
mod task;

pub use generator::{WorkloadShape, generate};
pub use task::{Endpoint, EndpointCategory, Task, TaskInput};
