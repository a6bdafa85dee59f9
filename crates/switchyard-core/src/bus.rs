//! Message bus abstraction used by the correlation broker.
//!
//! The bus carries two kinds of traffic: request events, delivered to the
//! single attached consumer, and response events, routed to the subscriber
//! registered for their id.
//!
//! [`InMemoryBus`] is the in-process implementation. Each in-flight id owns an
//! unbounded channel, so responses published before the producer starts
//! polling are buffered and replayed rather than lost.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::error::{BrokerError, BrokerResult};
use crate::packet::{OutgoingRequest, OutgoingResponse};

/// Receiving half for request events.
pub type RequestReceiver = mpsc::UnboundedReceiver<OutgoingRequest>;

/// Receiving half for the responses of one request id.
pub type ResponseReceiver = mpsc::UnboundedReceiver<OutgoingResponse>;

/// Publish/subscribe transport between producers and the consumer.
pub trait MessageBus: Send + Sync {
    /// Delivers a request event to the attached consumer.
    ///
    /// Fails with [`BrokerError::NoConsumer`] when nobody is listening.
    fn publish_request(&self, request: OutgoingRequest) -> BrokerResult<()>;

    /// Routes a response event to the subscriber of its id.
    ///
    /// A terminal response releases the subscription.
    fn publish_response(&self, response: OutgoingResponse);

    /// Attaches the request consumer, replacing any previous one.
    fn subscribe_requests(&self) -> RequestReceiver;

    /// Subscribes to the responses of a single request id.
    fn subscribe_once(&self, id: &str) -> BrokerResult<ResponseReceiver>;

    /// Drops the subscription for `id`, if any.
    fn unsubscribe(&self, id: &str);

    /// Returns `true` while a request consumer is attached.
    fn has_request_listener(&self) -> bool;

    /// Detaches the consumer and fails every pending subscription.
    fn close(&self);
}

/// In-process [`MessageBus`] backed by tokio channels.
#[derive(Default)]
pub struct InMemoryBus {
    requests: Mutex<Option<mpsc::UnboundedSender<OutgoingRequest>>>,
    pending: Mutex<HashMap<String, mpsc::UnboundedSender<OutgoingResponse>>>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids currently awaiting a terminal response.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }
}

impl MessageBus for InMemoryBus {
    fn publish_request(&self, request: OutgoingRequest) -> BrokerResult<()> {
        let mut requests = self.requests.lock();
        let Some(tx) = requests.as_ref() else {
            return Err(BrokerError::NoConsumer);
        };

        trace!(id = %request.id, "Publishing request event");
        if tx.send(request).is_err() {
            // The consumer went away without detaching.
            *requests = None;
            return Err(BrokerError::NoConsumer);
        }
        Ok(())
    }

    fn publish_response(&self, response: OutgoingResponse) {
        let id = response.id.clone();
        let terminal = response.is_disposed;
        let mut pending = self.pending.lock();

        let Some(tx) = pending.get(&id) else {
            warn!(id = %id, "Received response for unknown request id");
            return;
        };
        trace!(id = %id, terminal, "Routing response event");
        if tx.send(response).is_err() || terminal {
            pending.remove(&id);
        }
    }

    fn subscribe_requests(&self) -> RequestReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.requests.lock().replace(tx).is_some() {
            debug!("Replacing previously attached request consumer");
        }
        rx
    }

    fn subscribe_once(&self, id: &str) -> BrokerResult<ResponseReceiver> {
        let (tx, rx) = mpsc::unbounded_channel();
        match self.pending.lock().entry(id.to_string()) {
            Entry::Occupied(entry) if !entry.get().is_closed() => {
                Err(BrokerError::DuplicateRequestId { id: id.to_string() })
            }
            Entry::Occupied(mut entry) => {
                entry.insert(tx);
                Ok(rx)
            }
            Entry::Vacant(entry) => {
                entry.insert(tx);
                Ok(rx)
            }
        }
    }

    fn unsubscribe(&self, id: &str) {
        self.pending.lock().remove(id);
    }

    fn has_request_listener(&self) -> bool {
        self.requests
            .lock()
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    fn close(&self) {
        self.requests.lock().take();
        let mut pending = self.pending.lock();
        if !pending.is_empty() {
            debug!(count = pending.len(), "Failing pending subscriptions on close");
        }
        pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_without_consumer() {
        let bus = InMemoryBus::new();
        let request = OutgoingRequest::new("1", "*", json!(null));
        assert_eq!(bus.publish_request(request), Err(BrokerError::NoConsumer));
        assert!(!bus.has_request_listener());
    }

    #[test]
    fn test_dropped_consumer_is_detected() {
        let bus = InMemoryBus::new();
        drop(bus.subscribe_requests());
        assert!(!bus.has_request_listener());

        let request = OutgoingRequest::new("1", "*", json!(null));
        assert_eq!(bus.publish_request(request), Err(BrokerError::NoConsumer));
    }

    #[test]
    fn test_terminal_response_releases_subscription() {
        let bus = InMemoryBus::new();
        let mut rx = bus.subscribe_once("a").unwrap();

        bus.publish_response(OutgoingResponse::partial("a", json!(1)));
        assert_eq!(bus.pending_count(), 1);
        bus.publish_response(OutgoingResponse::reply("a", json!(2)));
        assert_eq!(bus.pending_count(), 0);

        assert_eq!(rx.try_recv().unwrap().response, Some(json!(1)));
        assert_eq!(rx.try_recv().unwrap().response, Some(json!(2)));
    }

    #[test]
    fn test_in_flight_id_cannot_be_reused() {
        let bus = InMemoryBus::new();
        let rx = bus.subscribe_once("a").unwrap();
        assert_eq!(
            bus.subscribe_once("a").unwrap_err(),
            BrokerError::DuplicateRequestId { id: "a".into() }
        );

        // Once the earlier subscriber is gone the id is free again.
        drop(rx);
        assert!(bus.subscribe_once("a").is_ok());
    }

    #[test]
    fn test_close_fails_pending() {
        let bus = InMemoryBus::new();
        let _requests = bus.subscribe_requests();
        let mut rx = bus.subscribe_once("a").unwrap();

        bus.close();
        assert!(!bus.has_request_listener());
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
