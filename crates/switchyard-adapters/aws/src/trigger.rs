//! Trigger detection.
//!
//! Detection works on the raw JSON so that unknown fields never get in the
//! way. Checks run in a fixed order and the first match wins:
//!
//! 1. API Gateway (REST v1, then HTTP v2)
//! 2. EventBridge
//! 3. Record batches where every record names the same source
//! 4. Anything else is a custom event

use serde_json::Value;

/// The kind of AWS trigger that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ApiGatewayV1,
    ApiGatewayV2,
    EventBridge,
    S3,
    Sns,
    Sqs,
    DynamoDb,
    Kinesis,
    Custom,
}

impl Trigger {
    /// Detects the trigger of a raw event.
    pub fn detect(event: &Value) -> Self {
        let Some(object) = event.as_object() else {
            return Self::Custom;
        };
        let has = |key: &str| object.contains_key(key);
        let is_string = |key: &str| object.get(key).is_some_and(Value::is_string);

        if has("requestContext") && has("isBase64Encoded") {
            if has("httpMethod") && has("path") {
                return Self::ApiGatewayV1;
            }
            if has("routeKey") && has("rawPath") {
                return Self::ApiGatewayV2;
            }
        }

        if is_string("source") && is_string("detail-type") {
            return Self::EventBridge;
        }

        if let Some(records) = object.get("Records").and_then(Value::as_array)
            && let Some(trigger) = batch_source(records)
        {
            return trigger;
        }

        Self::Custom
    }

    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ApiGatewayV1 | Self::ApiGatewayV2 => "apigateway",
            Self::EventBridge => "eventbridge",
            Self::S3 => "s3",
            Self::Sns => "sns",
            Self::Sqs => "sqs",
            Self::DynamoDb => "dynamodb",
            Self::Kinesis => "kinesis",
            Self::Custom => "custom",
        }
    }

    /// Returns `true` for record batches.
    pub fn is_batch(&self) -> bool {
        matches!(
            self,
            Self::S3 | Self::Sns | Self::Sqs | Self::DynamoDb | Self::Kinesis
        )
    }
}

fn record_source(record: &Value) -> Option<Trigger> {
    // SNS is the only source that capitalizes the field.
    if record.get("EventSource").and_then(Value::as_str) == Some("aws:sns") {
        return Some(Trigger::Sns);
    }
    match record.get("eventSource").and_then(Value::as_str)? {
        "aws:s3" => Some(Trigger::S3),
        "aws:sqs" => Some(Trigger::Sqs),
        "aws:dynamodb" => Some(Trigger::DynamoDb),
        "aws:kinesis" => Some(Trigger::Kinesis),
        _ => None,
    }
}

fn batch_source(records: &[Value]) -> Option<Trigger> {
    let (first, rest) = records.split_first()?;
    let source = record_source(first)?;
    rest.iter()
        .all(|record| record_source(record) == Some(source))
        .then_some(source)
}
