//! Single-task collaborators: the work a strategy schedules.
//!
//! A collaborator turns one [`TaskInput`] into a [`Payload`] or a
//! [`TaskError`]. Blocking calls serve the sequential, thread-pool, and
//! process-pool strategies; the event loop opens an [`AsyncCollaborator`]
//! session once per run, from inside its own runtime.
mod http;
mod primes;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{StrategyError, TaskError};
use crate::workload::TaskInput;

pub use http::HttpFetcher;
pub use primes::{PrimeCounter, count_primes, is_prime};

/// Output of a successful task.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(serde_json::Value),
    Primes { range: u64, prime_count: u64 },
}

pub trait Collaborator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Runs one task on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns the task's failure; callers record it rather than abort.
    fn call(&self, input: &TaskInput, timeout: Option<Duration>) -> Result<Payload, TaskError>;

    /// Opens a cooperative session for one event-loop run.
    ///
    /// # Errors
    ///
    /// Returns an error when the session's resources cannot be created.
    fn open_session(&self) -> Result<Arc<dyn AsyncCollaborator>, StrategyError>;

    /// Recipe for rebuilding this collaborator inside a worker process.
    fn remote_spec(&self) -> Option<CollaboratorSpec> {
        None
    }
}

#[async_trait]
pub trait AsyncCollaborator: Send + Sync {
    /// Runs one task; may suspend only while waiting on I/O.
    ///
    /// # Errors
    ///
    /// Returns the task's failure; callers record it rather than abort.
    async fn call(&self, input: &TaskInput, timeout: Option<Duration>)
    -> Result<Payload, TaskError>;
}

/// Runs a blocking collaborator inside the event loop without yielding.
///
/// CPU-bound work scheduled this way holds the loop until it returns.
pub struct InlineSession<C> {
    inner: Arc<C>,
}

impl<C> InlineSession<C> {
    #[must_use]
    pub const fn new(inner: Arc<C>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C> AsyncCollaborator for InlineSession<C>
where
    C: Collaborator + 'static,
{
    async fn call(
        &self,
        input: &TaskInput,
        timeout: Option<Duration>,
    ) -> Result<Payload, TaskError> {
        self.inner.call(input, timeout)
    }
}

/// Serializable description of a collaborator, shipped to worker processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollaboratorSpec {
    Http { base_url: String },
    Primes,
}

impl CollaboratorSpec {
    /// Rebuilds the described collaborator.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn build(&self) -> Result<Arc<dyn Collaborator>, StrategyError> {
        match self {
            CollaboratorSpec::Http { base_url } => Ok(Arc::new(HttpFetcher::new(base_url)?)),
            CollaboratorSpec::Primes => Ok(Arc::new(PrimeCounter)),
        }
    }
}

pub(crate) const fn input_kind(input: &TaskInput) -> &'static str {
    match input {
        TaskInput::Fetch(_) => "fetch",
        TaskInput::Compute(_) => "compute",
    }
}
