use serde_json::Value;
use switchyard_core::{AdapterResult, InvocationContext, OutgoingRequest, Pattern, RequestBuilder};

use super::decode;
use crate::model::EventBridgeEvent;

/// Builds requests from EventBridge events, routed by
/// `{source, detailType, detail}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBridgeRequestBuilder;

impl RequestBuilder for EventBridgeRequestBuilder {
    type Item = Value;

    fn build(&self, item: &Value, context: &InvocationContext) -> AdapterResult<OutgoingRequest> {
        let event: EventBridgeEvent = decode("eventbridge", item)?;
        let pattern = Pattern::mapping([
            ("source", Pattern::from(event.source)),
            ("detailType", Pattern::from(event.detail_type)),
            ("detail", Pattern::from(event.detail)),
        ]);
        Ok(OutgoingRequest::new(event.id, pattern, item.clone()).with_context(context.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build() {
        let event = json!({
            "id": "evt-1",
            "source": "billing",
            "detail-type": "InvoicePaid",
            "detail": { "amount": 10 },
            "time": "2024-01-01T00:00:00Z"
        });
        let request = EventBridgeRequestBuilder
            .build(&event, &InvocationContext::new())
            .unwrap();
        assert_eq!(request.id, "evt-1");
        assert_eq!(
            request.pattern,
            Pattern::from(json!({
                "source": "billing",
                "detailType": "InvoicePaid",
                "detail": { "amount": 10 }
            }))
        );
        assert_eq!(request.data, event);
    }
}
