//! Response builders.
//!
//! Each trigger kind acknowledges in one of four ways. The per-trigger
//! aliases at the bottom pick the policy for every supported trigger.

use serde_json::Value;
use switchyard_core::{
    Acknowledgement, BatchFailureKey, BatchFailures, DispatchResult, ResponseBuilder,
    ResponseTuple,
};
use tracing::debug;

/// Single-item request/reply: the one response value, or its error.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleReply;

impl ResponseBuilder for SingleReply {
    fn build(&self, tuples: Vec<ResponseTuple>) -> DispatchResult<Acknowledgement> {
        let value = match tuples.into_iter().next() {
            Some(tuple) => tuple.outcome?,
            None => Value::Null,
        };
        Ok(Acknowledgement::Reply(value))
    }
}

/// Fire-and-forget: nothing on success, the first error otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct FireAndForget;

impl ResponseBuilder for FireAndForget {
    fn build(&self, tuples: Vec<ResponseTuple>) -> DispatchResult<Acknowledgement> {
        for tuple in tuples {
            tuple.outcome?;
        }
        Ok(Acknowledgement::Empty)
    }
}

/// Multi-item request/reply: every response value in request order, or the
/// first error.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiReply;

impl ResponseBuilder for MultiReply {
    fn build(&self, tuples: Vec<ResponseTuple>) -> DispatchResult<Acknowledgement> {
        let values = tuples
            .into_iter()
            .map(|tuple| tuple.outcome)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Acknowledgement::Replies(values))
    }
}

/// Partial batch failure: the ids of failed requests, sorted. Successes are
/// left out and never fail the batch as a whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchFailureReport {
    key: BatchFailureKey,
}

impl BatchFailureReport {
    pub fn new(key: BatchFailureKey) -> Self {
        Self { key }
    }
}

impl ResponseBuilder for BatchFailureReport {
    fn build(&self, tuples: Vec<ResponseTuple>) -> DispatchResult<Acknowledgement> {
        let failed = tuples.into_iter().filter_map(|tuple| match tuple.outcome {
            Ok(_) => None,
            Err(e) => {
                debug!(id = %tuple.request.id, error = %e, "Batch item failed");
                Some(tuple.request.id)
            }
        });
        Ok(Acknowledgement::BatchFailures(BatchFailures::new(
            self.key, failed,
        )))
    }
}

pub type ApiGatewayResponseBuilder = SingleReply;
pub type CustomResponseBuilder = SingleReply;
pub type EventBridgeResponseBuilder = FireAndForget;
pub type S3ResponseBuilder = FireAndForget;
pub type SnsResponseBuilder = MultiReply;
pub type SqsResponseBuilder = BatchFailureReport;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchyard_core::{
        BrokerError, CorrelationError, DispatchError, OutgoingRequest, ResponseError,
    };

    fn ok(id: &str, value: Value) -> ResponseTuple {
        ResponseTuple::new(OutgoingRequest::new(id, "p", Value::Null), Ok(value))
    }

    fn failed(id: &str) -> ResponseTuple {
        ResponseTuple::new(
            OutgoingRequest::new(id, "p", Value::Null),
            Err(CorrelationError::new(id, ResponseError::handler("boom"))),
        )
    }

    #[test]
    fn test_single_reply() {
        let ack = SingleReply.build(vec![ok("1", json!("Results"))]).unwrap();
        assert_eq!(ack, Acknowledgement::Reply(json!("Results")));

        let err = SingleReply.build(vec![failed("1")]).unwrap_err();
        assert!(matches!(err, DispatchError::Correlation(_)));
        assert_eq!(
            err.to_string(),
            "The server failed to process the request, cause: boom"
        );
    }

    #[test]
    fn test_fire_and_forget() {
        let ack = FireAndForget.build(vec![ok("1", json!(1)), ok("2", json!(2))]).unwrap();
        assert!(ack.is_empty());
        assert!(FireAndForget.build(vec![ok("1", json!(1)), failed("2")]).is_err());
    }

    #[test]
    fn test_multi_reply_keeps_order() {
        let ack = MultiReply
            .build(vec![ok("b", json!("B")), ok("a", json!("A"))])
            .unwrap();
        assert_eq!(ack, Acknowledgement::Replies(vec![json!("B"), json!("A")]));

        let no_consumer = ResponseTuple::new(
            OutgoingRequest::new("c", "p", Value::Null),
            Err(CorrelationError::new("c", BrokerError::NoConsumer)),
        );
        let err = MultiReply.build(vec![ok("a", json!(1)), no_consumer]).unwrap_err();
        let DispatchError::Correlation(err) = err else {
            panic!("expected a correlation error");
        };
        assert!(err.is_no_consumer());
    }

    #[test]
    fn test_batch_failures_sorted() {
        let ack = BatchFailureReport::default()
            .build(vec![failed("m3"), ok("m0", json!(1)), failed("m2"), ok("m1", json!(1))])
            .unwrap();
        assert_eq!(
            ack.into_value(),
            json!({ "failedItems": [{ "itemIdentifier": "m2" }, { "itemIdentifier": "m3" }] })
        );

        let ack = BatchFailureReport::new(BatchFailureKey::BatchItemFailures)
            .build(vec![ok("m0", json!(1))])
            .unwrap();
        assert_eq!(ack.into_value(), json!({ "batchItemFailures": [] }));
    }
}
