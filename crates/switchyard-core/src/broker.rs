//! Correlation broker.
//!
//! The broker pairs each outgoing request with the responses published for
//! its id. A producer calls [`CorrelationBroker::send_request`] and receives a
//! [`ResponseStream`]; the consumer obtained from
//! [`CorrelationBroker::listen`] answers through
//! [`CorrelationBroker::respond`].
//!
//! ```text
//! producer ──send_request──▶ bus ──request──▶ consumer
//!    ▲                                          │
//!    └──── ResponseStream ◀── bus ◀──respond────┘
//! ```
//!
//! The stream subscribes before the request is published, so a response can
//! never overtake its subscription.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, info};

use crate::bus::{InMemoryBus, MessageBus, RequestReceiver, ResponseReceiver};
use crate::error::{BrokerError, BrokerResult, CorrelationError};
use crate::packet::{OutgoingRequest, OutgoingResponse};

/// Request/response correlation over a [`MessageBus`].
pub struct CorrelationBroker {
    bus: Arc<dyn MessageBus>,
}

impl Default for CorrelationBroker {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl CorrelationBroker {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }

    /// A broker over a fresh [`InMemoryBus`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryBus::new()))
    }

    pub fn bus(&self) -> &Arc<dyn MessageBus> {
        &self.bus
    }

    /// Attaches the consumer and returns the stream of request events.
    pub fn listen(&self) -> RequestReceiver {
        info!("Broker consumer attached");
        self.bus.subscribe_requests()
    }

    /// Returns `true` while a consumer is attached.
    pub fn is_listening(&self) -> bool {
        self.bus.has_request_listener()
    }

    /// Publishes `request` and returns the stream of its responses.
    ///
    /// Without an attached consumer the stream fails immediately with
    /// [`BrokerError::NoConsumer`].
    pub fn send_request(&self, request: OutgoingRequest) -> ResponseStream {
        let id = request.id.clone();
        if !self.is_listening() {
            debug!(id = %id, "No consumer attached, failing request");
            return ResponseStream::failed(id, BrokerError::NoConsumer);
        }

        let receiver = match self.bus.subscribe_once(&id) {
            Ok(receiver) => receiver,
            Err(e) => return ResponseStream::failed(id, e),
        };
        if let Err(e) = self.bus.publish_request(request) {
            self.bus.unsubscribe(&id);
            return ResponseStream::failed(id, e);
        }

        ResponseStream {
            id,
            state: StreamState::Pending {
                receiver,
                bus: self.bus.clone(),
            },
        }
    }

    /// Publishes a response event from the consumer side.
    pub fn respond(&self, response: OutgoingResponse) {
        self.bus.publish_response(response);
    }

    /// Detaches the consumer and fails every stream still awaiting a response.
    pub fn close(&self) {
        info!("Closing correlation broker");
        self.bus.close();
    }
}

// =============================================================================
// ResponseStream
// =============================================================================

enum StreamState {
    Failed(Option<BrokerError>),
    Pending {
        receiver: ResponseReceiver,
        bus: Arc<dyn MessageBus>,
    },
    Done,
}

/// The responses correlated to one request.
///
/// Yields every response published for the id and ends after the terminal
/// one. If the broker closes first, the stream yields
/// [`BrokerError::Closed`] and ends. Dropping an unfinished stream releases
/// its subscription.
pub struct ResponseStream {
    id: String,
    state: StreamState,
}

impl ResponseStream {
    fn failed(id: String, err: BrokerError) -> Self {
        Self {
            id,
            state: StreamState::Failed(Some(err)),
        }
    }

    /// Id of the request this stream belongs to.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Waits for the terminal response and collapses the stream into the
    /// last response value or a [`CorrelationError`].
    pub async fn outcome(mut self) -> Result<Value, CorrelationError> {
        let mut last = Value::Null;
        while let Some(item) = self.next().await {
            let response = item.map_err(|e| CorrelationError::new(self.id.clone(), e))?;
            if let Some(err) = response.err {
                return Err(CorrelationError::new(self.id.clone(), err));
            }
            if let Some(value) = response.response {
                last = value;
            }
            if response.is_disposed {
                return Ok(last);
            }
        }
        Err(CorrelationError::new(
            self.id.clone(),
            BrokerError::Closed {
                id: self.id.clone(),
            },
        ))
    }
}

impl Stream for ResponseStream {
    type Item = BrokerResult<OutgoingResponse>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match &mut this.state {
            StreamState::Failed(err) => {
                let err = err.take();
                this.state = StreamState::Done;
                Poll::Ready(err.map(Err))
            }
            StreamState::Pending { receiver, .. } => match receiver.poll_recv(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(Some(response)) => {
                    if response.is_disposed {
                        this.state = StreamState::Done;
                    }
                    Poll::Ready(Some(Ok(response)))
                }
                Poll::Ready(None) => {
                    this.state = StreamState::Done;
                    Poll::Ready(Some(Err(BrokerError::Closed {
                        id: this.id.clone(),
                    })))
                }
            },
            StreamState::Done => Poll::Ready(None),
        }
    }
}

impl Drop for ResponseStream {
    fn drop(&mut self) {
        if let StreamState::Pending { bus, .. } = &self.state {
            bus.unsubscribe(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CorrelationCause, ResponseError};
    use serde_json::json;
    use std::time::Duration;

    fn request(id: &str) -> OutgoingRequest {
        OutgoingRequest::new(id, "echo", json!({ "n": id }))
    }

    #[tokio::test]
    async fn test_no_consumer_fails_immediately() {
        let broker = CorrelationBroker::in_memory();
        let mut stream = broker.send_request(request("1"));

        let first = tokio_test::assert_ready!(futures::poll!(stream.next()));
        assert_eq!(first, Some(Err(BrokerError::NoConsumer)));
        assert_eq!(stream.next().await, None);

        let err = broker.send_request(request("2")).outcome().await.unwrap_err();
        assert!(err.is_no_consumer());
        assert_eq!(err.request_id, "2");
    }

    #[tokio::test]
    async fn test_round_trip() {
        let broker = CorrelationBroker::in_memory();
        let mut requests = broker.listen();

        let stream = broker.send_request(request("1"));
        let received = requests.recv().await.unwrap();
        assert_eq!(received.id, "1");
        broker.respond(OutgoingResponse::reply("1", json!("pong")));

        assert_eq!(stream.outcome().await.unwrap(), json!("pong"));
    }

    #[tokio::test]
    async fn test_response_before_polling_is_replayed() {
        let broker = CorrelationBroker::in_memory();
        let _requests = broker.listen();

        let stream = broker.send_request(request("1"));
        broker.respond(OutgoingResponse::partial("1", json!(1)));
        broker.respond(OutgoingResponse::reply("1", json!(2)));

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].as_ref().unwrap().response, Some(json!(2)));
    }

    #[tokio::test]
    async fn test_remote_error_is_correlated() {
        let broker = CorrelationBroker::in_memory();
        let _requests = broker.listen();

        let stream = broker.send_request(request("42"));
        broker.respond(OutgoingResponse::failure(
            "42",
            ResponseError::no_handler_qualified(),
        ));

        let err = stream.outcome().await.unwrap_err();
        assert_eq!(err.request_id, "42");
        assert_eq!(
            err.cause,
            CorrelationCause::Remote(ResponseError::no_handler_qualified())
        );
        assert_eq!(
            err.to_string(),
            "The server failed to process the request, cause: No handler qualified to process the message"
        );
    }

    #[tokio::test]
    async fn test_concurrent_requests_resolve_by_id() {
        let broker = Arc::new(CorrelationBroker::in_memory());
        let mut requests = broker.listen();

        let streams: Vec<_> = (0..16)
            .map(|i| broker.send_request(request(&i.to_string())))
            .collect();

        // Answer in reverse arrival order.
        let mut received = Vec::new();
        for _ in 0..16 {
            received.push(requests.recv().await.unwrap());
        }
        let responder = broker.clone();
        tokio::spawn(async move {
            for req in received.into_iter().rev() {
                tokio::time::sleep(Duration::from_millis(1)).await;
                responder.respond(OutgoingResponse::reply(req.id.clone(), req.data));
            }
        });

        let outcomes = futures::future::join_all(streams.into_iter().map(|s| s.outcome())).await;
        for (i, outcome) in outcomes.into_iter().enumerate() {
            assert_eq!(outcome.unwrap(), json!({ "n": i.to_string() }));
        }
    }

    #[tokio::test]
    async fn test_close_unblocks_waiters() {
        let broker = Arc::new(CorrelationBroker::in_memory());
        let _requests = broker.listen();

        let stream = broker.send_request(request("1"));
        let waiter = tokio::spawn(stream.outcome());
        tokio::task::yield_now().await;
        broker.close();

        let err = waiter.await.unwrap().unwrap_err();
        assert_eq!(
            err.cause,
            CorrelationCause::Broker(BrokerError::Closed { id: "1".into() })
        );
        assert!(!broker.is_listening());
    }

    #[tokio::test]
    async fn test_dropping_stream_releases_subscription() {
        let bus = Arc::new(InMemoryBus::new());
        let broker = CorrelationBroker::new(bus.clone());
        let _requests = broker.listen();

        let stream = broker.send_request(request("1"));
        assert_eq!(bus.pending_count(), 1);
        drop(stream);
        assert_eq!(bus.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_in_flight_id() {
        let broker = CorrelationBroker::in_memory();
        let _requests = broker.listen();

        let _first = broker.send_request(request("1"));
        let err = broker.send_request(request("1")).outcome().await.unwrap_err();
        assert_eq!(
            err.cause,
            CorrelationCause::Broker(BrokerError::DuplicateRequestId { id: "1".into() })
        );
    }
}
