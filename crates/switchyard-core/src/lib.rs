//! # Switchyard Core
//!
//! The core engine of the Switchyard event router.
//!
//! Inbound events are routed to exactly one registered handler by structural
//! pattern matching, and every dispatched request is correlated with its
//! response over an in-process bus.
//!
//! ## Components
//!
//! - **Patterns** ([`pattern`]): the [`Pattern`] data model and the
//!   [`matches`] engine, including partial-match and catch-all semantics.
//! - **Registry** ([`registry`]): ordered handler registrations with
//!   exact-key fast path, first-registered-wins scan and catch-all fallback.
//! - **Broker** ([`broker`], [`bus`]): request/response correlation by id over
//!   an injected [`MessageBus`].
//! - **Adapter seams** ([`mapper`], [`ack`]): traits implemented by
//!   trigger-specific adapters and the [`Acknowledgement`] they produce.
//!
//! ## Data Flow
//!
//! ```text
//! raw event ─▶ EventMapper ─▶ [OutgoingRequest] ─▶ CorrelationBroker ─▶ consumer
//!                                                        │                │
//!                                                        │         HandlerRegistry
//!                                                        ▼                │
//! Acknowledgement ◀─ ResponseBuilder ◀─ [ResponseTuple] ◀─┴── OutgoingResponse
//! ```

pub mod ack;
pub mod broker;
pub mod bus;
pub mod context;
pub mod error;
pub mod handler;
pub mod mapper;
pub mod packet;
pub mod pattern;
pub mod registry;

pub use ack::{Acknowledgement, BatchFailureKey, BatchFailures, FailedItem};
pub use broker::{CorrelationBroker, ResponseStream};
pub use bus::{InMemoryBus, MessageBus, RequestReceiver, ResponseReceiver};
pub use context::InvocationContext;
pub use error::{
    AdapterError, AdapterResult, BrokerError, BrokerResult, CorrelationCause, CorrelationError,
    DispatchError, DispatchResult, ErrorKind, RegistryError, RegistryResult, ResponseError,
};
pub use handler::{BoxFuture, BoxedHandler, HandlerKind, HandlerOutput, handler_fn};
pub use mapper::{ConfigurableMapper, EventMapper, MappedEvent, RequestBuilder, ResponseBuilder};
pub use packet::{OutgoingRequest, OutgoingResponse, ResponseTuple};
pub use pattern::{CATCH_ALL, Pattern, matches};
pub use registry::{HandlerExtras, HandlerRegistry, Registration, Resolution};
