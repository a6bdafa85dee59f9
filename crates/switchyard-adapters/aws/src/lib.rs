//! # Switchyard Adapter for AWS Lambda
//!
//! Normalizes the events Lambda hands to a function into Switchyard
//! requests, and turns handler outcomes back into what each trigger expects.
//!
//! ## Supported Triggers
//!
//! | trigger          | request id              | pattern                                                     | acknowledgement        |
//! |------------------|-------------------------|-------------------------------------------------------------|------------------------|
//! | API Gateway v1/v2| `requestContext.requestId` | `{httpMethod, resource, queryStringParameters, pathParameters}` | the handler's reply |
//! | EventBridge      | `id`                    | `{source, detailType, detail}`                              | nothing                |
//! | S3               | random UUID             | `{eventName, bucketName, objectKey}`                        | nothing                |
//! | SNS              | `Sns.MessageId`         | coerced `MessageAttributes`                                 | list of replies        |
//! | SQS              | `messageId`             | SNS envelope attributes, else coerced `messageAttributes`   | failed item ids        |
//! | anything else    | random UUID             | `"/"`                                                       | the handler's reply    |
//!
//! DynamoDB Streams and Kinesis batches are recognized but rejected unless
//! [`AwsConfig::unknown_sources`] is set to [`UnknownSources::Custom`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard_adapter_aws::AwsEventMapper;
//! use switchyard_runtime::SwitchyardRuntime;
//!
//! // Reads `[adapters.aws]` from the configuration, if present.
//! let runtime = SwitchyardRuntime::builder().build_with_mapper::<AwsEventMapper>()?;
//! runtime.register(CATCH_ALL, fallback)?;
//! runtime.start()?;
//! let ack = runtime.process_event(event, context).await?;
//! ```

pub mod attributes;
pub mod config;
pub mod mapper;
pub mod model;
pub mod request;
pub mod response;
pub mod trigger;

pub use config::{AwsConfig, UnknownSources};
pub use mapper::AwsEventMapper;
pub use request::{
    ApiGatewayRequestBuilder, CUSTOM_PATTERN, CustomRequestBuilder, EventBridgeRequestBuilder,
    S3RequestBuilder, SnsRequestBuilder, SqsRequestBuilder,
};
pub use response::{BatchFailureReport, FireAndForget, MultiReply, SingleReply};
pub use trigger::Trigger;
