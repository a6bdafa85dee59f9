//! Seams between the dispatch entry point and trigger-specific adapters.
//!
//! An [`EventMapper`] inspects a raw event, decides which trigger produced
//! it and returns a [`MappedEvent`]: the normalized requests plus the
//! [`ResponseBuilder`] that turns their outcomes into the trigger's
//! acknowledgement.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ack::Acknowledgement;
use crate::context::InvocationContext;
use crate::error::{AdapterResult, DispatchResult};
use crate::packet::{OutgoingRequest, ResponseTuple};

/// Converts one raw item of a trigger into an outgoing request.
pub trait RequestBuilder {
    /// The decoded item this builder consumes.
    type Item;

    fn build(&self, item: &Self::Item, context: &InvocationContext)
    -> AdapterResult<OutgoingRequest>;
}

/// Builds a trigger's acknowledgement from the outcomes of its requests.
pub trait ResponseBuilder: Send + Sync {
    fn build(&self, tuples: Vec<ResponseTuple>) -> DispatchResult<Acknowledgement>;
}

/// A raw event normalized into requests.
pub struct MappedEvent {
    /// Name of the detected trigger kind, for logging.
    pub trigger: &'static str,
    pub requests: Vec<OutgoingRequest>,
    pub responder: Box<dyn ResponseBuilder>,
}

impl MappedEvent {
    pub fn new(
        trigger: &'static str,
        requests: Vec<OutgoingRequest>,
        responder: impl ResponseBuilder + 'static,
    ) -> Self {
        Self {
            trigger,
            requests,
            responder: Box::new(responder),
        }
    }
}

impl std::fmt::Debug for MappedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedEvent")
            .field("trigger", &self.trigger)
            .field("requests", &self.requests)
            .finish_non_exhaustive()
    }
}

/// Detects the trigger of a raw event and normalizes it.
pub trait EventMapper: Send + Sync {
    fn map_event(&self, event: Value, context: &InvocationContext) -> AdapterResult<MappedEvent>;
}

/// An [`EventMapper`] that can be built from its configuration section.
pub trait ConfigurableMapper: EventMapper + Sized + 'static {
    /// Configuration type, read from `adapters.<name>`.
    type Config: DeserializeOwned + Default;

    /// Name of the configuration section.
    fn name() -> &'static str;

    fn from_config(config: Self::Config) -> AdapterResult<Self>;
}
