//! Error types for the Dappier API client.
//!
//! # Design
//! Every failure carries its cause so callers can tell transport trouble
//! (worth retrying) apart from validation or decoding problems (not worth
//! retrying). The client never retries or logs errors itself.

use thiserror::Error;

/// Boxed cause produced by an `HttpClient` implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures raised by an `HttpClient` while talking to the network.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, refused connection, timeout).
    #[error("error making HTTP request: {0}")]
    Send(#[source] BoxError),

    /// A response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    ReadBody(#[source] BoxError),
}

/// Errors returned by `DappierApp` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required string argument was empty. Carries the argument name.
    #[error("{0} cannot be empty")]
    InvalidArgument(&'static str),

    /// The request payload could not be serialized to JSON.
    #[error("failed to marshal request data: {0}")]
    SerializationError(#[source] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with something other than 200.
    #[error("received non-OK response status: {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body was not JSON of the expected shape.
    #[error("failed to unmarshal response: {0}")]
    DeserializationError(#[source] serde_json::Error),

    /// The response was well-formed but held zero results.
    #[error("no results found")]
    EmptyResult,
}

impl ApiError {
    /// Status code of an `UnexpectedStatus` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the same call might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
