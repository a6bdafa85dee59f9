use serde_json::Value;
use switchyard_core::{AdapterResult, InvocationContext, OutgoingRequest, Pattern, RequestBuilder};
use tracing::trace;

use super::decode;
use super::sns::SnsRequestBuilder;
use crate::attributes::attributes_pattern;
use crate::model::{SnsMessage, SqsRecord};

/// Builds one request per SQS record.
///
/// A record whose body is an SNS notification is routed by the
/// notification's attributes. If the body is not a notification, or its
/// attributes cannot be coerced, the record's own `messageAttributes` are
/// used instead.
#[derive(Debug, Clone, Copy)]
pub struct SqsRequestBuilder {
    unwrap_sns_envelopes: bool,
}

impl Default for SqsRequestBuilder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SqsRequestBuilder {
    const TRIGGER: &'static str = "sqs";

    pub fn new(unwrap_sns_envelopes: bool) -> Self {
        Self {
            unwrap_sns_envelopes,
        }
    }

    /// Returns the SNS notification carried in the body, if any.
    pub fn unwrap_sns_envelope(record: &SqsRecord) -> Option<SnsMessage> {
        serde_json::from_str::<SnsMessage>(&record.body)
            .ok()
            .filter(SnsMessage::is_notification)
    }

    fn pattern(&self, record: &SqsRecord) -> AdapterResult<Pattern> {
        if self.unwrap_sns_envelopes
            && let Some(message) = Self::unwrap_sns_envelope(record)
        {
            match SnsRequestBuilder::message_pattern(&message) {
                Ok(pattern) => return Ok(pattern),
                Err(e) => trace!(error = %e, "Falling back to SQS attributes"),
            }
        }

        attributes_pattern(record.message_attributes.iter().map(|(name, attr)| {
            (name.as_str(), attr.data_type.as_str(), attr.string_value.as_deref())
        }))
    }
}

impl RequestBuilder for SqsRequestBuilder {
    type Item = Value;

    fn build(&self, item: &Value, context: &InvocationContext) -> AdapterResult<OutgoingRequest> {
        let record: SqsRecord = decode(Self::TRIGGER, item)?;
        let pattern = self.pattern(&record)?;
        Ok(OutgoingRequest::new(record.message_id, pattern, item.clone()).with_context(context.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchyard_core::AdapterError;

    fn record(body: &str, attributes: Value) -> Value {
        json!({
            "eventSource": "aws:sqs",
            "messageId": "m-1",
            "body": body,
            "messageAttributes": attributes
        })
    }

    fn sns_body(attributes: Value) -> String {
        json!({
            "Type": "Notification",
            "MessageId": "sns-1",
            "TopicArn": "arn:aws:sns:eu-west-1:123:orders",
            "Message": "hello",
            "MessageAttributes": attributes
        })
        .to_string()
    }

    #[test]
    fn test_own_attributes() {
        let item = record(
            "plain body",
            json!({ "command": { "dataType": "String", "stringValue": "sum" } }),
        );
        let request = SqsRequestBuilder::default()
            .build(&item, &InvocationContext::new())
            .unwrap();
        assert_eq!(request.id, "m-1");
        assert_eq!(request.pattern, Pattern::from(json!({ "command": "sum" })));
        assert_eq!(request.data, item);
    }

    #[test]
    fn test_unwraps_sns_envelope() {
        let body = sns_body(json!({ "command": { "Type": "String", "Value": "from-sns" } }));
        let item = record(
            &body,
            json!({ "command": { "dataType": "String", "stringValue": "from-sqs" } }),
        );

        let request = SqsRequestBuilder::default()
            .build(&item, &InvocationContext::new())
            .unwrap();
        assert_eq!(request.id, "m-1");
        assert_eq!(request.pattern, Pattern::from(json!({ "command": "from-sns" })));

        let request = SqsRequestBuilder::new(false)
            .build(&item, &InvocationContext::new())
            .unwrap();
        assert_eq!(request.pattern, Pattern::from(json!({ "command": "from-sqs" })));
    }

    #[test]
    fn test_bad_envelope_attributes_fall_back() {
        let body = sns_body(json!({ "blob": { "Type": "Binary", "Value": "AAE=" } }));
        let item = record(
            &body,
            json!({ "command": { "dataType": "String", "stringValue": "fallback" } }),
        );
        let request = SqsRequestBuilder::default()
            .build(&item, &InvocationContext::new())
            .unwrap();
        assert_eq!(request.pattern, Pattern::from(json!({ "command": "fallback" })));
    }

    #[test]
    fn test_non_sns_topic_is_not_unwrapped() {
        let body = json!({
            "Type": "Notification",
            "TopicArn": "arn:other",
            "MessageAttributes": { "x": { "Type": "String", "Value": "y" } }
        })
        .to_string();
        let item = record(&body, json!({}));
        let request = SqsRequestBuilder::default()
            .build(&item, &InvocationContext::new())
            .unwrap();
        assert_eq!(request.pattern, Pattern::Mapping(Default::default()));
    }

    #[test]
    fn test_binary_attribute_fails() {
        let item = record("x", json!({ "blob": { "dataType": "Binary", "stringValue": "AAE=" } }));
        let err = SqsRequestBuilder::default()
            .build(&item, &InvocationContext::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Attribute type not implemented: Binary");
        assert!(matches!(err, AdapterError::AttributeTypeNotImplemented { .. }));
    }
}
