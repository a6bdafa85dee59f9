use serde_json::Value;
use switchyard_core::{AdapterResult, InvocationContext, OutgoingRequest, Pattern, RequestBuilder};

use super::decode;
use crate::attributes::attributes_pattern;
use crate::model::{SnsMessage, SnsRecord};

/// Builds one request per SNS record.
///
/// The id is the notification's `MessageId`, the pattern is built from its
/// `MessageAttributes` and the data is the notification itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnsRequestBuilder;

impl SnsRequestBuilder {
    const TRIGGER: &'static str = "sns";

    /// Builds the attribute pattern of a notification.
    pub fn message_pattern(message: &SnsMessage) -> AdapterResult<Pattern> {
        attributes_pattern(message.message_attributes.iter().map(|(name, attr)| {
            (name.as_str(), attr.data_type.as_str(), attr.value.as_deref())
        }))
    }
}

impl RequestBuilder for SnsRequestBuilder {
    type Item = Value;

    fn build(&self, item: &Value, context: &InvocationContext) -> AdapterResult<OutgoingRequest> {
        let record: SnsRecord = decode(Self::TRIGGER, item)?;
        let message: SnsMessage = decode(Self::TRIGGER, &record.sns)?;
        let pattern = Self::message_pattern(&message)?;
        Ok(OutgoingRequest::new(message.message_id, pattern, record.sns).with_context(context.clone()))
    }
}
