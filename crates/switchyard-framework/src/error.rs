//! Error types for the Switchyard framework.

use serde_json::Value;
use switchyard_core::ResponseError;
use thiserror::Error;
use tower::BoxError;

/// Errors that can occur during request extraction.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The request payload does not deserialize into the expected type.
    #[error("invalid payload for '{expected}': {reason}")]
    InvalidPayload {
        /// Expected type name.
        expected: &'static str,
        /// Deserialization error.
        reason: String,
    },
}

/// Errors returned by handlers.
///
/// Only [`HandlerError::Rpc`] and extraction failures reach the caller with
/// their message intact; everything else is reported as an internal error.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// An error meant for the caller, with optional structured details.
    #[error("{message}")]
    Rpc {
        message: String,
        details: Option<Value>,
    },

    /// A handler parameter could not be extracted.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// An unexpected failure; the message is only logged.
    #[error("{0}")]
    Internal(BoxError),
}

impl HandlerError {
    /// Creates an error whose message is sent back to the caller.
    pub fn rpc(message: impl Into<String>) -> Self {
        Self::Rpc {
            message: message.into(),
            details: None,
        }
    }

    /// Creates an error with structured details for the caller.
    pub fn rpc_with_details(message: impl Into<String>, details: Value) -> Self {
        Self::Rpc {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Wraps an arbitrary error as an internal failure.
    pub fn internal(err: impl Into<BoxError>) -> Self {
        Self::Internal(err.into())
    }

    /// Returns `true` if the message stays server-side.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Converts into the error payload published on the bus.
    pub fn into_response_error(self) -> ResponseError {
        match self {
            Self::Rpc { message, details } => ResponseError {
                details,
                ..ResponseError::handler(message)
            },
            Self::Extract(err) => ResponseError::handler(err.to_string()),
            Self::Internal(_) => ResponseError::internal(),
        }
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::rpc(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::rpc(message)
    }
}

impl From<BoxError> for HandlerError {
    fn from(err: BoxError) -> Self {
        Self::Internal(err)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(Box::new(err))
    }
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Result type for handlers.
pub type HandlerResult<T> = Result<T, HandlerError>;
