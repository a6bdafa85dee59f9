use serde_json::Value;
use switchyard_core::{AdapterResult, InvocationContext, OutgoingRequest, Pattern, RequestBuilder};
use uuid::Uuid;

use super::decode;
use crate::model::S3Record;

/// Builds one request per S3 record, routed by
/// `{eventName, bucketName, objectKey}`.
///
/// S3 records carry no unique id, so each request gets a fresh UUID.
#[derive(Debug, Clone, Copy, Default)]
pub struct S3RequestBuilder;

impl RequestBuilder for S3RequestBuilder {
    type Item = Value;

    fn build(&self, item: &Value, context: &InvocationContext) -> AdapterResult<OutgoingRequest> {
        let record: S3Record = decode("s3", item)?;
        let pattern = Pattern::mapping([
            ("eventName", record.event_name),
            ("bucketName", record.s3.bucket.name),
            ("objectKey", record.s3.object.key),
        ]);
        Ok(
            OutgoingRequest::new(Uuid::new_v4().to_string(), pattern, item.clone())
                .with_context(context.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build() {
        let record = json!({
            "eventSource": "aws:s3",
            "eventName": "ObjectCreated:Put",
            "s3": { "bucket": { "name": "uploads" }, "object": { "key": "a.png", "size": 3 } }
        });
        let first = S3RequestBuilder.build(&record, &InvocationContext::new()).unwrap();
        let second = S3RequestBuilder.build(&record, &InvocationContext::new()).unwrap();

        assert_eq!(
            first.pattern,
            Pattern::from(json!({
                "eventName": "ObjectCreated:Put",
                "bucketName": "uploads",
                "objectKey": "a.png"
            }))
        );
        assert_eq!(first.data, record);
        assert_ne!(first.id, second.id);
        assert!(Uuid::parse_str(&first.id).is_ok());
    }
}
