//! Typed views of AWS trigger payloads.
//!
//! Only the fields needed to build patterns and ids are modelled; the raw
//! JSON is what gets forwarded to handlers.

pub mod apigateway;
pub mod eventbridge;
pub mod s3;
pub mod sns;
pub mod sqs;

pub use apigateway::{ApiGatewayV1Event, ApiGatewayV2Event, RequestContext};
pub use eventbridge::EventBridgeEvent;
pub use s3::S3Record;
pub use sns::{SnsMessage, SnsMessageAttribute, SnsRecord};
pub use sqs::{SqsMessageAttribute, SqsRecord};
