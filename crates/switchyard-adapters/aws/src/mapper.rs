//! The AWS event mapper.

use serde_json::Value;
use switchyard_core::{
    AdapterError, AdapterResult, ConfigurableMapper, EventMapper, InvocationContext, MappedEvent,
    OutgoingRequest, RequestBuilder, ResponseBuilder,
};
use tracing::{debug, warn};

use crate::config::{AwsConfig, UnknownSources};
use crate::request::{
    ApiGatewayRequestBuilder, CustomRequestBuilder, EventBridgeRequestBuilder, S3RequestBuilder,
    SnsRequestBuilder, SqsRequestBuilder,
};
use crate::response::{
    ApiGatewayResponseBuilder, BatchFailureReport, CustomResponseBuilder,
    EventBridgeResponseBuilder, S3ResponseBuilder, SnsResponseBuilder,
};
use crate::trigger::Trigger;

/// Maps raw AWS Lambda events onto requests and acknowledgements.
#[derive(Debug, Clone, Default)]
pub struct AwsEventMapper {
    config: AwsConfig,
}

impl AwsEventMapper {
    pub fn new(config: AwsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AwsConfig {
        &self.config
    }

    fn single<B, R>(
        trigger: Trigger,
        builder: B,
        event: &Value,
        context: &InvocationContext,
        responder: R,
    ) -> AdapterResult<MappedEvent>
    where
        B: RequestBuilder<Item = Value>,
        R: ResponseBuilder + 'static,
    {
        let request = builder.build(event, context)?;
        Ok(MappedEvent::new(trigger.name(), vec![request], responder))
    }

    fn batch<B, R>(
        trigger: Trigger,
        builder: B,
        event: &Value,
        context: &InvocationContext,
        responder: R,
    ) -> AdapterResult<MappedEvent>
    where
        B: RequestBuilder<Item = Value>,
        R: ResponseBuilder + 'static,
    {
        let records = event
            .get("Records")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let requests = records
            .iter()
            .map(|record| builder.build(record, context))
            .collect::<AdapterResult<Vec<OutgoingRequest>>>()?;
        Ok(MappedEvent::new(trigger.name(), requests, responder))
    }
}

impl EventMapper for AwsEventMapper {
    fn map_event(&self, event: Value, context: &InvocationContext) -> AdapterResult<MappedEvent> {
        let trigger = Trigger::detect(&event);
        debug!(trigger = trigger.name(), "Detected trigger");

        match trigger {
            Trigger::ApiGatewayV1 | Trigger::ApiGatewayV2 => Self::single(
                trigger,
                ApiGatewayRequestBuilder,
                &event,
                context,
                ApiGatewayResponseBuilder::default(),
            ),
            Trigger::EventBridge => Self::single(
                trigger,
                EventBridgeRequestBuilder,
                &event,
                context,
                EventBridgeResponseBuilder::default(),
            ),
            Trigger::S3 => Self::batch(
                trigger,
                S3RequestBuilder,
                &event,
                context,
                S3ResponseBuilder::default(),
            ),
            Trigger::Sns => Self::batch(
                trigger,
                SnsRequestBuilder,
                &event,
                context,
                SnsResponseBuilder::default(),
            ),
            Trigger::Sqs => Self::batch(
                trigger,
                SqsRequestBuilder::new(self.config.unwrap_sns_envelopes),
                &event,
                context,
                BatchFailureReport::new(self.config.batch_failure_key),
            ),
            Trigger::DynamoDb | Trigger::Kinesis => match self.config.unknown_sources {
                UnknownSources::Reject => {
                    warn!(trigger = trigger.name(), "Rejecting unsupported event source");
                    Err(AdapterError::UnsupportedSource(trigger.name().to_string()))
                }
                UnknownSources::Custom => Self::single(
                    Trigger::Custom,
                    CustomRequestBuilder,
                    &event,
                    context,
                    CustomResponseBuilder::default(),
                ),
            },
            Trigger::Custom => Self::single(
                trigger,
                CustomRequestBuilder,
                &event,
                context,
                CustomResponseBuilder::default(),
            ),
        }
    }
}

impl ConfigurableMapper for AwsEventMapper {
    type Config = AwsConfig;

    fn name() -> &'static str {
        "aws"
    }

    fn from_config(config: AwsConfig) -> AdapterResult<Self> {
        Ok(Self::new(config))
    }
}
