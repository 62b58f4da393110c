//! Error types for the campus API client.
//!
//! # Design
//! The client distinguishes a single failure kind. Whether the server
//! rejected the request, the network dropped it, or the body failed to parse,
//! callers receive `RequestFailed` with a human-readable message. The status
//! code is kept alongside when the server produced one, but nothing branches
//! on it inside the core.

use thiserror::Error;

/// Errors returned by the client core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request did not produce a usable response.
    #[error("{message}")]
    RequestFailed {
        message: String,
        status: Option<u16>,
    },
}

impl ApiError {
    /// A failure that never reached an HTTP status (transport, encoding, parsing).
    pub fn request_failed(message: impl Into<String>) -> Self {
        ApiError::RequestFailed {
            message: message.into(),
            status: None,
        }
    }

    /// A failure derived from a non-success HTTP response.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        ApiError::RequestFailed {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::RequestFailed { message, .. } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => *status,
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_bare_message() {
        let err = ApiError::from_status(400, "College not found");
        assert_eq!(err.to_string(), "College not found");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn transport_failures_carry_no_status() {
        let err = ApiError::request_failed("connection refused");
        assert_eq!(err.message(), "connection refused");
        assert!(err.status().is_none());
    }
}
