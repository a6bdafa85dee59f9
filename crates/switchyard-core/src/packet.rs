//! Packets exchanged over the message bus.
//!
//! A request event carries `{id, pattern, data, context}`; a response event
//! carries `{id, response?, err?, isDisposed}`. A response with
//! `isDisposed = true` is terminal for its id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::InvocationContext;
use crate::error::{CorrelationError, ResponseError};
use crate::pattern::Pattern;

/// A normalized request produced by an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingRequest {
    /// Correlation token, unique while the request is in flight.
    pub id: String,
    pub pattern: Pattern,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub context: InvocationContext,
}

impl OutgoingRequest {
    pub fn new(id: impl Into<String>, pattern: impl Into<Pattern>, data: Value) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            data,
            context: InvocationContext::default(),
        }
    }

    pub fn with_context(mut self, context: InvocationContext) -> Self {
        self.context = context;
        self
    }
}

/// A response event correlated to a request by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<ResponseError>,
    #[serde(default)]
    pub is_disposed: bool,
}

impl OutgoingResponse {
    /// A terminal success.
    pub fn reply(id: impl Into<String>, response: Value) -> Self {
        Self {
            id: id.into(),
            response: Some(response),
            err: None,
            is_disposed: true,
        }
    }

    /// An intermediate value; more responses for this id will follow.
    pub fn partial(id: impl Into<String>, response: Value) -> Self {
        Self {
            is_disposed: false,
            ..Self::reply(id, response)
        }
    }

    /// A terminal failure.
    pub fn failure(id: impl Into<String>, err: ResponseError) -> Self {
        Self {
            id: id.into(),
            response: None,
            err: Some(err),
            is_disposed: true,
        }
    }

    /// A bare completion marker.
    pub fn disposed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            response: None,
            err: None,
            is_disposed: true,
        }
    }
}

/// One request paired with its outcome.
///
/// Tuples for a raw event are handed to the response builder in the order the
/// requests were issued.
#[derive(Debug, Clone)]
pub struct ResponseTuple {
    pub request: OutgoingRequest,
    pub outcome: Result<Value, CorrelationError>,
}

impl ResponseTuple {
    pub fn new(request: OutgoingRequest, outcome: Result<Value, CorrelationError>) -> Self {
        Self { request, outcome }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn error(&self) -> Option<&CorrelationError> {
        self.outcome.as_ref().err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_wire_shape() {
        let ok = OutgoingResponse::reply("1", json!("Results"));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "id": "1", "response": "Results", "isDisposed": true })
        );

        let err = OutgoingResponse::failure("2", ResponseError::no_handler_qualified());
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "id": "2",
                "err": {
                    "kind": "no_handler_qualified",
                    "message": "No handler qualified to process the message"
                },
                "isDisposed": true
            })
        );
    }

    #[test]
    fn test_request_defaults_missing_fields() {
        let request: OutgoingRequest =
            serde_json::from_value(json!({ "id": "7", "pattern": { "cmd": "sum" } })).unwrap();
        assert_eq!(request.data, Value::Null);
        assert_eq!(request.context, InvocationContext::default());
        assert_eq!(request.pattern.normalize(), r#"{"cmd":"sum"}"#);
    }
}
