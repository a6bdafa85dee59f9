//! The producer side: the dispatch entry point.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use switchyard_core::{
    Acknowledgement, CorrelationBroker, DispatchResult, EventMapper, InvocationContext,
    OutgoingRequest, ResponseTuple,
};
use tracing::{Instrument, debug, debug_span};

/// Turns raw trigger events into requests and their outcomes into an
/// acknowledgement.
pub struct Client<M> {
    broker: Arc<CorrelationBroker>,
    mapper: M,
}

impl<M: EventMapper> Client<M> {
    pub fn new(broker: Arc<CorrelationBroker>, mapper: M) -> Self {
        Self { broker, mapper }
    }

    pub fn broker(&self) -> &Arc<CorrelationBroker> {
        &self.broker
    }

    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Processes one invocation event.
    ///
    /// Every request derived from the event is dispatched concurrently. The
    /// call completes once all of them have an outcome, so a failing request
    /// never cuts its siblings short.
    pub async fn process_event(
        &self,
        event: Value,
        context: InvocationContext,
    ) -> DispatchResult<Acknowledgement> {
        let mapped = self.mapper.map_event(event, &context)?;
        let span = debug_span!(
            "dispatch",
            trigger = mapped.trigger,
            requests = mapped.requests.len()
        );

        async move {
            let tuples = self.send_all(mapped.requests).await;
            let failed = tuples.iter().filter(|t| !t.is_success()).count();
            debug!(failed, "All requests settled");
            mapped.responder.build(tuples)
        }
        .instrument(span)
        .await
    }

    /// Sends every request and waits for all outcomes, in request order.
    pub async fn send_all(&self, requests: Vec<OutgoingRequest>) -> Vec<ResponseTuple> {
        join_all(requests.into_iter().map(|request| async move {
            let outcome = self.broker.send_request(request.clone()).outcome().await;
            ResponseTuple::new(request, outcome)
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::HandlerGroup;
    use crate::server::Server;
    use switchyard_core::{
        AdapterError, AdapterResult, DispatchError, HandlerRegistry, MappedEvent, ResponseBuilder,
    };

    /// One request per array element, acknowledged with the replies in order.
    struct ArrayMapper;

    struct CollectReplies;

    impl ResponseBuilder for CollectReplies {
        fn build(&self, tuples: Vec<ResponseTuple>) -> DispatchResult<Acknowledgement> {
            let mut replies = Vec::with_capacity(tuples.len());
            for tuple in tuples {
                replies.push(tuple.outcome?);
            }
            Ok(Acknowledgement::Replies(replies))
        }
    }

    impl EventMapper for ArrayMapper {
        fn map_event(&self, event: Value, _: &InvocationContext) -> AdapterResult<MappedEvent> {
            let Value::Array(items) = event else {
                return Err(AdapterError::UnsupportedSource("not an array".into()));
            };
            let requests = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| OutgoingRequest::new(i.to_string(), "echo", item))
                .collect();
            Ok(MappedEvent::new("array", requests, CollectReplies))
        }
    }

    async fn echo(data: Value) -> Value {
        data
    }

    fn start() -> (Server, Client<ArrayMapper>) {
        let mut registry = HandlerRegistry::new();
        HandlerGroup::new()
            .message("echo", echo)
            .register_into(&mut registry)
            .unwrap();
        let broker = Arc::new(CorrelationBroker::in_memory());
        let server = Server::new(Arc::new(registry), broker.clone());
        server.listen();
        (server, Client::new(broker, ArrayMapper))
    }

    #[tokio::test]
    async fn test_process_event_preserves_order() {
        let (server, client) = start();
        let ack = client
            .process_event(serde_json::json!([1, "two", null]), InvocationContext::new())
            .await
            .unwrap();
        assert_eq!(
            ack,
            Acknowledgement::Replies(vec![
                serde_json::json!(1),
                serde_json::json!("two"),
                Value::Null
            ])
        );
        server.close().await;
    }

    #[tokio::test]
    async fn test_adapter_error_surfaces() {
        let (server, client) = start();
        let err = client
            .process_event(serde_json::json!({}), InvocationContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Adapter(_)));
        server.close().await;
    }

    #[tokio::test]
    async fn test_no_consumer_reported_per_request() {
        let broker = Arc::new(CorrelationBroker::in_memory());
        let client = Client::new(broker, ArrayMapper);
        let tuples = client
            .send_all(vec![
                OutgoingRequest::new("a", "echo", Value::Null),
                OutgoingRequest::new("b", "echo", Value::Null),
            ])
            .await;
        assert_eq!(tuples.len(), 2);
        assert!(tuples.iter().all(|t| t.error().is_some_and(|e| e.is_no_consumer())));
    }
}
