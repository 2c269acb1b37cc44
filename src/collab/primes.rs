use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{StrategyError, TaskError};
use crate::workload::TaskInput;

use super::{AsyncCollaborator, Collaborator, CollaboratorSpec, InlineSession, Payload, input_kind};

/// Numbers checked between deadline polls.
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// CPU-bound collaborator: counts primes below a bound by trial division.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimeCounter;

impl Collaborator for PrimeCounter {
    fn name(&self) -> &'static str {
        "primes"
    }

    fn call(&self, input: &TaskInput, timeout: Option<Duration>) -> Result<Payload, TaskError> {
        let TaskInput::Compute(bound) = input else {
            return Err(TaskError::Unsupported {
                collaborator: self.name().to_owned(),
                input: input_kind(input).to_owned(),
            });
        };
        let deadline = timeout.map(|after| (Instant::now(), after));
        let prime_count = count_primes(*bound, deadline)?;
        Ok(Payload::Primes {
            range: *bound,
            prime_count,
        })
    }

    fn open_session(&self) -> Result<Arc<dyn AsyncCollaborator>, StrategyError> {
        Ok(Arc::new(InlineSession::new(Arc::new(*self))))
    }

    fn remote_spec(&self) -> Option<CollaboratorSpec> {
        Some(CollaboratorSpec::Primes)
    }
}

/// Counts primes in `[2, bound)`.
///
/// `deadline` is `(started, budget)`; the count stops with
/// [`TaskError::Timeout`] once the budget is spent.
///
/// # Errors
///
/// Returns [`TaskError::Timeout`] when the deadline passes mid-count.
pub fn count_primes(bound: u64, deadline: Option<(Instant, Duration)>) -> Result<u64, TaskError> {
    let mut count = 0u64;
    for candidate in 2..bound {
        if candidate % DEADLINE_CHECK_INTERVAL == 0
            && let Some((started, budget)) = deadline
            && started.elapsed() >= budget
        {
            return Err(TaskError::Timeout { after: budget });
        }
        if is_prime(candidate) {
            count = count.saturating_add(1);
        }
    }
    Ok(count)
}

#[must_use]
pub fn is_prime(value: u64) -> bool {
    if value < 2 {
        return false;
    }
    let mut divisor = 2u64;
    while let Some(square) = divisor.checked_mul(divisor) {
        if square > value {
            break;
        }
        if value % divisor == 0 {
            return false;
        }
        divisor = divisor.saturating_add(1);
    }
    true
}
