//! SNS records and notifications.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// One record of an SNS-triggered invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct SnsRecord {
    /// The notification, kept raw since it is forwarded as the request data.
    #[serde(rename = "Sns")]
    pub sns: Value,
}

/// An SNS notification, either from an SNS record or embedded in an SQS
/// message body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnsMessage {
    #[serde(default)]
    pub message_id: String,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub topic_arn: Option<String>,
    #[serde(default)]
    pub message_attributes: BTreeMap<String, SnsMessageAttribute>,
}

impl SnsMessage {
    /// Returns `true` if this looks like a notification published by SNS.
    pub fn is_notification(&self) -> bool {
        self.kind.as_deref() == Some("Notification")
            && self
                .topic_arn
                .as_deref()
                .is_some_and(|arn| arn.starts_with("arn:aws:sns"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SnsMessageAttribute {
    #[serde(rename = "Type")]
    pub data_type: String,
    #[serde(default)]
    pub value: Option<String>,
}
