use crate::error::ConfigError;

use super::task::{Endpoint, EndpointCategory, Task, TaskInput};

/// How task inputs are derived from their index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadShape {
    /// Rotate through the endpoint categories.
    Io,
    /// Ramp the prime-count bound by `step` per task.
    Cpu { base_complexity: u64, step: u64 },
}

/// Builds the ordered task list every strategy in a run executes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTaskCount`] for a zero count, and
/// [`ConfigError::InvalidComplexityStep`] / [`ConfigError::ComplexityOverflow`]
/// when a CPU ramp is not strictly increasing or does not fit in `u64`.
pub fn generate(count: usize, shape: WorkloadShape) -> Result<Vec<Task>, ConfigError> {
    if count == 0 {
        return Err(ConfigError::InvalidTaskCount { count });
    }
    match shape {
        WorkloadShape::Io => Ok((0..count).map(io_task).collect()),
        WorkloadShape::Cpu {
            base_complexity,
            step,
        } => {
            if step == 0 {
                return Err(ConfigError::InvalidComplexityStep);
            }
            (0..count)
                .map(|index| cpu_task(index, base_complexity, step))
                .collect()
        }
    }
}

fn io_task(index: usize) -> Task {
    let request_number = (index as u64).saturating_add(1);
    let category = EndpointCategory::for_request(request_number);
    let id = (request_number % category.size()).saturating_add(1);
    Task::new(index, TaskInput::Fetch(Endpoint { category, id }))
}

fn cpu_task(index: usize, base_complexity: u64, step: u64) -> Result<Task, ConfigError> {
    let bound = (index as u64)
        .checked_mul(step)
        .and_then(|offset| base_complexity.checked_add(offset))
        .ok_or(ConfigError::ComplexityOverflow { index })?;
    Ok(Task::new(index, TaskInput::Compute(bound)))
}
