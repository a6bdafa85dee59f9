//! Unified error types for the Switchyard core.
//!
//! Errors are grouped by the component that raises them. Framework-level
//! errors (handler and extraction failures) live in `switchyard-framework`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors raised while building the handler registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two handlers claim the same normalized pattern.
    #[error("a handler is already registered for pattern `{pattern}`")]
    DuplicateRegistration {
        /// The normalized pattern key.
        pattern: String,
    },
}

impl RegistryError {
    /// Creates a duplicate registration error.
    pub fn duplicate(pattern: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            pattern: pattern.into(),
        }
    }
}

// =============================================================================
// Broker Errors
// =============================================================================

/// Errors surfaced by the correlation broker to a producer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrokerError {
    /// No consumer was attached when the request was sent.
    #[error(
        "No consumer is currently connected to the broker. The messages emitted by the client will be lost."
    )]
    NoConsumer,

    /// The broker was closed before a terminal response arrived.
    #[error("broker closed before request `{id}` was answered")]
    Closed {
        /// The request that was left unanswered.
        id: String,
    },

    /// A request with the same id is still awaiting its response.
    #[error("request id `{id}` is already in flight")]
    DuplicateRequestId {
        /// The conflicting request id.
        id: String,
    },
}

// =============================================================================
// Wire Errors
// =============================================================================

/// Classification of a failed response published by the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Resolution found no exact, partial or catch-all handler.
    NoHandlerQualified,
    /// Resolution selected an event-only handler where a reply was expected.
    IllegalEventHandler,
    /// The handler ran and reported an error meant for the caller.
    Handler,
    /// The handler failed unexpectedly; details stay server-side.
    Internal,
}

/// Error payload carried in the `err` field of a response event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ResponseError {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Optional structured payload supplied by the handler.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ResponseError {
    pub const NO_HANDLER_QUALIFIED: &'static str = "No handler qualified to process the message";
    pub const ILLEGAL_EVENT_HANDLER: &'static str =
        "An illegal event handler qualified for processing the current message";
    pub const INTERNAL: &'static str = "Internal server error";

    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn no_handler_qualified() -> Self {
        Self::new(ErrorKind::NoHandlerQualified, Self::NO_HANDLER_QUALIFIED)
    }

    pub fn illegal_event_handler() -> Self {
        Self::new(ErrorKind::IllegalEventHandler, Self::ILLEGAL_EVENT_HANDLER)
    }

    pub fn handler(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Handler, message)
    }

    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal, Self::INTERNAL)
    }

    /// Attaches a structured payload.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

// =============================================================================
// Correlation Errors
// =============================================================================

/// The underlying reason a correlated request failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorrelationCause {
    /// The broker could not deliver the request or its response.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// The consumer answered with an error response.
    #[error(transparent)]
    Remote(#[from] ResponseError),
}

/// A failed request, tagged with the id of the request that produced it.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("The server failed to process the request, cause: {cause}")]
pub struct CorrelationError {
    /// Id of the originating request.
    pub request_id: String,
    /// Why it failed.
    pub cause: CorrelationCause,
}

impl CorrelationError {
    pub fn new(request_id: impl Into<String>, cause: impl Into<CorrelationCause>) -> Self {
        Self {
            request_id: request_id.into(),
            cause: cause.into(),
        }
    }

    /// Returns `true` if nobody was listening when the request was sent.
    pub fn is_no_consumer(&self) -> bool {
        matches!(self.cause, CorrelationCause::Broker(BrokerError::NoConsumer))
    }

    /// The error response published by the consumer, if any.
    pub fn remote(&self) -> Option<&ResponseError> {
        match &self.cause {
            CorrelationCause::Remote(err) => Some(err),
            CorrelationCause::Broker(_) => None,
        }
    }

    /// Kind of the remote failure, if the consumer answered.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.remote().map(|err| err.kind)
    }
}

// =============================================================================
// Adapter Errors
// =============================================================================

/// Errors raised while normalizing a raw trigger event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdapterError {
    /// The event matched a trigger kind but could not be decoded.
    #[error("failed to parse {trigger} event: {reason}")]
    Parse {
        /// Trigger kind being decoded.
        trigger: &'static str,
        /// Reason for failure.
        reason: String,
    },

    /// A message attribute uses an encoding that is not supported.
    #[error("Attribute type not implemented: {data_type}")]
    AttributeTypeNotImplemented {
        /// The attribute's declared data type.
        data_type: String,
    },

    /// A message attribute value does not fit its declared type.
    #[error("invalid value for attribute `{name}`: {reason}")]
    InvalidAttribute {
        /// Attribute name.
        name: String,
        /// Reason for failure.
        reason: String,
    },

    /// The trigger kind was recognized but is not handled.
    #[error("event source `{0}` is not supported")]
    UnsupportedSource(String),
}

impl AdapterError {
    pub fn parse(trigger: &'static str, reason: impl ToString) -> Self {
        Self::Parse {
            trigger,
            reason: reason.to_string(),
        }
    }

    pub fn invalid_attribute(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidAttribute {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors returned from a dispatch of one raw event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The raw event could not be normalized.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// A correlated request failed and the response builder re-threw it.
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Result type for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
