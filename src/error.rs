//! Error Handling
//!
//! Volley surfaces errors through exactly two channels. Invalid
//! configuration is reported as an [`Error`] when a client (or batch
//! options) is constructed. Everything that goes wrong while a batch is in
//! flight (DNS, connect, TLS, timeouts, decode failures, longtail
//! cancellation) is captured per request inside its
//! [`Response`](crate::Response) record and never fails the batch call.
//!
//! Callers that want exceptions per record opt in through
//! [`Response::raise_for_status`](crate::Response::raise_for_status).

use thiserror::Error;

/// Errors returned by volley's construction and opt-in escalation paths.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid client or batch configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The underlying HTTP client could not be built, or a record-level
    /// failure was escalated via `raise_for_status`.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A non-success HTTP status escalated via `raise_for_status`.
    #[error("HTTP status {status} for {url}")]
    Status {
        /// The response status code.
        status: u16,
        /// The URL that produced it.
        url: String,
    },

    /// JSON (de)serialization failure from the `Response::json` accessor.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn display_includes_details() {
        let err = Error::Status {
            status: 503,
            url: "https://example.com/x".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("503"));
        assert!(text.contains("https://example.com/x"));
    }
}
