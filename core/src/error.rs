//! Error types for the employee API client.
//!
//! # Design
//! A failed request never surfaces as `Err` from the builder; the error is
//! stored on the `Outcome` instead. `HttpFailure` keeps the raw response next
//! to the flattened message so callers can still inspect status and body.

use std::fmt;

use thiserror::Error;

use crate::http::HttpResponse;

/// A non-2xx response with its human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    pub message: String,
    pub response: HttpResponse,
}

impl HttpFailure {
    pub fn status(&self) -> u16 {
        self.response.status
    }
}

impl fmt::Display for HttpFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpFailure {}

/// Everything that can end up in `Outcome::error`.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The server answered with a non-success status.
    #[error(transparent)]
    Http(#[from] HttpFailure),

    /// The request never produced a response (connection refused, DNS, ...).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response body was not the JSON we expected.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The cancellation handle was triggered before the response arrived.
    #[error("request was cancelled")]
    Cancelled,
}

impl RequestError {
    /// The failed response, if the server produced one.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            RequestError::Http(failure) => Some(&failure.response),
            _ => None,
        }
    }
}

/// Errors raised by a `Transport` implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("network request failed: {0}")]
    Network(String),
}

/// Errors raised by persisted credential stores.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors raised while loading `ClientConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL {0:?}: expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_failure_displays_message_only() {
        let err = RequestError::from(HttpFailure {
            message: "is required".to_string(),
            response: HttpResponse {
                status: 422,
                status_text: "Unprocessable Entity".to_string(),
                headers: Vec::new(),
                body: String::new(),
            },
        });
        assert_eq!(err.to_string(), "is required");
        assert_eq!(err.response().map(|r| r.status), Some(422));
    }

    #[test]
    fn transport_error_has_no_response() {
        let err = RequestError::from(TransportError::Network("connection refused".to_string()));
        assert!(err.response().is_none());
        assert_eq!(err.to_string(), "network request failed: connection refused");
    }
}
