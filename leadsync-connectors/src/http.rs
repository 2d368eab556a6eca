//! Blocking HTTP plumbing shared by the store clients.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::ConnectorError;

/// An error status returned by a store, with its raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ApiFailure {
    pub status: u16,
    pub body: String,
}

impl ApiFailure {
    /// Whether the store refused this particular request, as opposed to
    /// refusing the caller (auth, throttling) or failing itself.
    pub fn is_rejection(&self) -> bool {
        (400..500).contains(&self.status) && !matches!(self.status, 401 | 403 | 429)
    }
}

pub(crate) fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

/// Split a ureq result into a response, an API error status, or a
/// transport failure.
pub(crate) fn classify(
    result: Result<ureq::Response, ureq::Error>,
) -> Result<Result<ureq::Response, ApiFailure>, ConnectorError> {
    match result {
        Ok(response) => Ok(Ok(response)),
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_else(|err| {
                tracing::debug!(status, error = %err, "could not read error response body");
                String::new()
            });
            Ok(Err(ApiFailure { status, body }))
        }
        Err(ureq::Error::Transport(transport)) => Err(ConnectorError::Transport(transport)),
    }
}

/// Decode a JSON body, naming the service on failure.
pub(crate) fn read_json<T: DeserializeOwned>(
    service: &'static str,
    response: ureq::Response,
) -> Result<T, ConnectorError> {
    response
        .into_json()
        .map_err(|source| ConnectorError::Decode { service, source })
}

/// Require a successful response, turning an error status into
/// [`ConnectorError::Api`] with messages parsed by `messages`.
pub(crate) fn expect_ok(
    service: &'static str,
    result: Result<ureq::Response, ureq::Error>,
    messages: fn(&ApiFailure) -> Vec<String>,
) -> Result<ureq::Response, ConnectorError> {
    match classify(result)? {
        Ok(response) => Ok(response),
        Err(failure) => Err(ConnectorError::Api {
            service,
            status: failure.status,
            messages: messages(&failure),
        }),
    }
}

/// Fallback message for an error body no parser understood.
pub(crate) fn raw_message(failure: &ApiFailure) -> String {
    let body = failure.body.trim();
    if body.is_empty() {
        format!("HTTP {}", failure.status)
    } else {
        body.to_string()
    }
}
