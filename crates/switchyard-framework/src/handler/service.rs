//! Tower integration for handlers.
//!
//! [`HandlerService`] wraps a single handler and implements
//! `tower::Service<Arc<OutgoingRequest>>`, so cross-cutting concerns can be
//! stacked on top as ordinary tower layers. [`from_service`] goes the other
//! way and turns any such service back into a registrable [`BoxedHandler`].
//!
//! ```rust,ignore
//! use tower::ServiceBuilder;
//!
//! let svc = ServiceBuilder::new()
//!     .map_response(|reply: Value| json!({ "data": reply }))
//!     .service(HandlerService::new(get_book));
//! registry.register("books.get", from_service(svc), HandlerKind::Message, HandlerExtras::default())?;
//! ```

use std::marker::PhantomData;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use switchyard_core::{BoxedHandler, OutgoingRequest};
use tower::{Service, ServiceExt};

use super::traits::{Handler, report_error};
use crate::error::HandlerError;

/// A tower [`Service`] that calls a single generic handler.
pub struct HandlerService<H, T> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<H, T> HandlerService<H, T> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

impl<H: Clone, T> Clone for HandlerService<H, T> {
    fn clone(&self) -> Self {
        HandlerService {
            handler: self.handler.clone(),
            _marker: PhantomData,
        }
    }
}

impl<H, T> Service<Arc<OutgoingRequest>> for HandlerService<H, T>
where
    H: Handler<T>,
{
    type Response = Value;
    type Error = HandlerError;
    type Future = BoxFuture<'static, Result<Value, HandlerError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Arc<OutgoingRequest>) -> Self::Future {
        self.handler.clone().call(request)
    }
}

/// Converts a tower service into a [`BoxedHandler`].
///
/// Each call drives a fresh clone of the service to readiness before use.
pub fn from_service<S>(service: S) -> BoxedHandler
where
    S: Service<Arc<OutgoingRequest>, Response = Value> + Clone + Send + Sync + 'static,
    S::Error: Into<HandlerError>,
    S::Future: Send + 'static,
{
    Arc::new(move |request: Arc<OutgoingRequest>| {
        let service = service.clone();
        async move {
            let id = request.id.clone();
            service
                .oneshot(request)
                .await
                .map_err(|e| report_error(&id, e.into()))
        }
        .boxed()
    })
}
