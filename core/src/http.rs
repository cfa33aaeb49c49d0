//! HTTP transport types and the pluggable client that executes them.
//!
//! # Design
//! Requests and responses are plain data. `DappierApp` builds an
//! `HttpRequest`, hands it to an `HttpClient`, and parses whatever
//! `HttpResponse` comes back. Swapping the `HttpClient` is how callers add
//! proxies, custom TLS, tracing middleware, or test fakes.
//!
//! Every request the API accepts is a JSON `POST`, so the request type
//! carries no method field.

use std::fmt;
use std::time::Duration;

use tracing::trace;

use crate::error::TransportError;

/// A JSON POST described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one `HttpRequest` and returns the response.
///
/// Implementations must report non-2xx statuses as an `HttpResponse`, not as
/// an error; status interpretation belongs to the caller. A client shared
/// between threads must be safe for concurrent use.
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default `HttpClient` backed by a blocking `ureq` agent.
#[derive(Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new() -> Self {
        Self::from_agent(
            ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build()
                .new_agent(),
        )
    }

    /// Client whose requests fail once `timeout` elapses.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::from_agent(
            ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent(),
        )
    }

    /// Wrap an agent the caller configured (proxy, TLS, user agent, ...).
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqClient").finish_non_exhaustive()
    }
}

impl HttpClient for UreqClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.agent.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = match builder.send(request.body.as_bytes()) {
            Ok(response) => response,
            // Agents configured with `http_status_as_error(true)` surface the
            // status as an error and drop the body.
            Err(ureq::Error::StatusCode(status)) => {
                trace!(status, "status reported as error by agent");
                return Ok(HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: String::new(),
                });
            }
            Err(e) => return Err(TransportError::Send(Box::new(e))),
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = if status == 200 {
            response
                .body_mut()
                .read_to_string()
                .map_err(|e| TransportError::ReadBody(Box::new(e)))?
        } else {
            response.body_mut().read_to_string().unwrap_or_else(|e| {
                trace!(status, error = %e, "dropping unreadable error body");
                String::new()
            })
        };
        trace!(status, bytes = body.len(), "read response body");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
