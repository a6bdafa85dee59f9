//! Request builders, one per trigger kind.
//!
//! Every builder consumes one raw JSON item (the whole event for
//! single-item triggers, one record for batches), decodes the typed view it
//! needs and produces an [`OutgoingRequest`](switchyard_core::OutgoingRequest)
//! carrying the invocation context.

mod apigateway;
mod custom;
mod eventbridge;
mod s3;
mod sns;
mod sqs;

pub use apigateway::ApiGatewayRequestBuilder;
pub use custom::{CUSTOM_PATTERN, CustomRequestBuilder};
pub use eventbridge::EventBridgeRequestBuilder;
pub use s3::S3RequestBuilder;
pub use sns::SnsRequestBuilder;
pub use sqs::SqsRequestBuilder;

use serde::de::DeserializeOwned;
use serde_json::Value;
use switchyard_core::{AdapterError, AdapterResult};

/// Decodes the typed view of a raw item.
fn decode<T: DeserializeOwned>(trigger: &'static str, item: &Value) -> AdapterResult<T> {
    T::deserialize(item).map_err(|e| AdapterError::parse(trigger, e))
}
