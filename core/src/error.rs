//! Error types for the task service client.
//!
//! # Design
//! One variant per failure category: argument checks that run before any
//! I/O, transport failures while sending or draining a response, unexpected
//! status codes, and JSON encode/decode failures. Application errors that the
//! service embeds inside a nominally successful response are NOT errors at
//! this level; they travel inside `ServiceResponse::error` and the caller
//! decides what to do with them.

use crate::types::ServiceError;

/// Errors returned by `TaskClient` operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required identifier or request payload was missing. No I/O happened.
    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    /// The request could not be sent (connection refused, timeout, ...).
    #[error("Failed to send request to Task Service - error={0}")]
    Transport(String),

    /// The request was sent but the response body could not be read.
    #[error("Failed to read response from Task Service - error={0}")]
    BodyRead(String),

    /// The service answered with a status code other than the one the
    /// operation expects. `body` is the raw response text; `service_error` is
    /// filled when that text happens to be an error envelope.
    #[error("{operation} Task failed - status: {status}, body: {body}")]
    UnexpectedStatus {
        operation: &'static str,
        status: u16,
        body: String,
        service_error: Option<ServiceError>,
    },

    /// A payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Status code of an `UnexpectedStatus` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_message_carries_code_and_body() {
        let err = ApiError::UnexpectedStatus {
            operation: "Create",
            status: 500,
            body: "internal error".to_string(),
            service_error: None,
        };
        assert_eq!(err.to_string(), "Create Task failed - status: 500, body: internal error");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn other_variants_have_no_status() {
        assert_eq!(ApiError::InvalidArgument("x".to_string()).status(), None);
        assert_eq!(ApiError::Transport("refused".to_string()).status(), None);
    }
}
