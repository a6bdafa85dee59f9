use serde_json::Value;
use switchyard_core::{AdapterResult, InvocationContext, OutgoingRequest, RequestBuilder};
use uuid::Uuid;

/// Pattern of every custom event.
pub const CUSTOM_PATTERN: &str = "/";

/// Forwards an unrecognized event unchanged under the `"/"` pattern.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomRequestBuilder;

impl RequestBuilder for CustomRequestBuilder {
    type Item = Value;

    fn build(&self, item: &Value, context: &InvocationContext) -> AdapterResult<OutgoingRequest> {
        Ok(
            OutgoingRequest::new(Uuid::new_v4().to_string(), CUSTOM_PATTERN, item.clone())
                .with_context(context.clone()),
        )
    }
}
