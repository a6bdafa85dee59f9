//! SQS records.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqsRecord {
    pub message_id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub message_attributes: BTreeMap<String, SqsMessageAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqsMessageAttribute {
    pub data_type: String,
    #[serde(default)]
    pub string_value: Option<String>,
}
