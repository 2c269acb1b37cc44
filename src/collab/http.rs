use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{StrategyError, TaskError};
use crate::workload::{Endpoint, TaskInput};

use super::{AsyncCollaborator, Collaborator, CollaboratorSpec, Payload, input_kind};

pub(crate) const USER_AGENT: &str = concat!("stratbench/", env!("CARGO_PKG_VERSION"));

/// I/O-bound collaborator: one GET per task against `{base_url}/{category}/{id}`.
pub struct HttpFetcher {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Builds the blocking client used by thread-based strategies.
    ///
    /// The client carries no default timeout. Only a per-call timeout bounds
    /// a request, matching the async session.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, StrategyError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| StrategyError::Session {
                message: err.to_string(),
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint<'input>(&self, input: &'input TaskInput) -> Result<&'input Endpoint, TaskError> {
        match input {
            TaskInput::Fetch(endpoint) => Ok(endpoint),
            TaskInput::Compute(_) => Err(TaskError::Unsupported {
                collaborator: self.name().to_owned(),
                input: input_kind(input).to_owned(),
            }),
        }
    }
}

impl Collaborator for HttpFetcher {
    fn name(&self) -> &'static str {
        "http"
    }

    fn call(&self, input: &TaskInput, timeout: Option<Duration>) -> Result<Payload, TaskError> {
        let endpoint = self.endpoint(input)?;
        let url = format!("{}{}", self.base_url, endpoint.path());
        let mut request = self.client.get(&url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .map_err(|err| map_transport_error(&err, timeout))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Status {
                status: status.as_u16(),
            });
        }
        let body = response
            .json::<serde_json::Value>()
            .map_err(|err| map_body_error(&err, timeout))?;
        Ok(Payload::Json(body))
    }

    fn open_session(&self) -> Result<Arc<dyn AsyncCollaborator>, StrategyError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| StrategyError::Session {
                message: err.to_string(),
            })?;
        debug!("Opened async HTTP session for {}", self.base_url);
        Ok(Arc::new(HttpSession {
            base_url: self.base_url.clone(),
            client,
        }))
    }

    fn remote_spec(&self) -> Option<CollaboratorSpec> {
        Some(CollaboratorSpec::Http {
            base_url: self.base_url.clone(),
        })
    }
}

/// Async client bound to a single event-loop run.
struct HttpSession {
    base_url: String,
    client: reqwest::Client,
}

#[async_trait]
impl AsyncCollaborator for HttpSession {
    async fn call(
        &self,
        input: &TaskInput,
        timeout: Option<Duration>,
    ) -> Result<Payload, TaskError> {
        let TaskInput::Fetch(endpoint) = input else {
            return Err(TaskError::Unsupported {
                collaborator: "http".to_owned(),
                input: input_kind(input).to_owned(),
            });
        };
        let url = format!("{}{}", self.base_url, endpoint.path());
        let mut request = self.client.get(&url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request
            .send()
            .await
            .map_err(|err| map_transport_error(&err, timeout))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Status {
                status: status.as_u16(),
            });
        }
        let body = response
            .json::<serde_json::Value>()
            .await
            .map_err(|err| map_body_error(&err, timeout))?;
        Ok(Payload::Json(body))
    }
}

fn map_transport_error(err: &reqwest::Error, timeout: Option<Duration>) -> TaskError {
    match timeout {
        Some(after) if err.is_timeout() => TaskError::Timeout { after },
        Some(_) | None => TaskError::Network {
            message: err.to_string(),
        },
    }
}

fn map_body_error(err: &reqwest::Error, timeout: Option<Duration>) -> TaskError {
    // A stalled body surfaces as a decode error wrapping the timeout.
    if let Some(after) = timeout
        && err.is_timeout()
    {
        return TaskError::Timeout { after };
    }
    if err.is_decode() {
        return TaskError::Decode {
            message: err.to_string(),
        };
    }
    map_transport_error(err, timeout)
}
