//! Type-erased handlers stored in the registry.
//!
//! The framework layer turns ordinary async functions into [`BoxedHandler`]s;
//! the core only needs something it can call with a request.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
pub use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::ResponseError;
use crate::packet::OutgoingRequest;

/// What a handler produces: a reply value or a wire error.
pub type HandlerOutput = Result<Value, ResponseError>;

/// A type-erased handler that can be stored in collections.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<OutgoingRequest>) -> BoxFuture<'static, HandlerOutput> + Send + Sync>;

/// Wraps a closure taking the raw request into a [`BoxedHandler`].
pub fn handler_fn<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<OutgoingRequest>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerOutput> + Send + 'static,
{
    Arc::new(move |request| f(request).boxed())
}

/// Whether a registration answers requests or only observes events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandlerKind {
    /// Produces a reply for the caller.
    #[default]
    Message,
    /// Fire-and-forget listener; qualifying for a request is an error.
    Event,
}
