//! Handler system for the Switchyard framework.
//!
//! Handlers are plain async functions. The [`Handler`] trait is implemented
//! for functions of 0-8 parameters that implement
//! [`FromRequest`](crate::extractor::FromRequest) and return any
//! [`IntoReply`] type, similar to Axum's handler system.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_framework::{HandlerError, Json, Payload, RequestId};
//!
//! // No parameters
//! async fn ping() -> &'static str {
//!     "pong"
//! }
//!
//! // Typed payload, fallible
//! async fn get_book(Payload(query): Payload<BookQuery>) -> Result<Json<Book>, HandlerError> {
//!     let book = lookup(query.id).ok_or_else(|| HandlerError::rpc("book not found"))?;
//!     Ok(Json(book))
//! }
//! ```

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use switchyard_core::{BoxedHandler, OutgoingRequest};
use tracing::{error, warn};

use crate::error::HandlerError;
use crate::extractor::FromRequest;

// ============================================================================
// IntoReply - Convert handler return values
// ============================================================================

/// A trait for types that can be returned from handlers.
pub trait IntoReply: Send + 'static {
    fn into_reply(self) -> Result<Value, HandlerError>;
}

/// `()` replies with `null`.
impl IntoReply for () {
    fn into_reply(self) -> Result<Value, HandlerError> {
        Ok(Value::Null)
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Value, HandlerError> {
        Ok(self)
    }
}

macro_rules! impl_into_reply_via_json {
    ($($ty:ty),*) => {
        $(
            impl IntoReply for $ty {
                fn into_reply(self) -> Result<Value, HandlerError> {
                    Ok(Value::from(self))
                }
            }
        )*
    };
}

impl_into_reply_via_json!(String, &'static str, bool, i32, i64, u32, u64, f64);

/// Serializes any [`Serialize`] value as the reply.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: Serialize + Send + 'static> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Value, HandlerError> {
        Ok(serde_json::to_value(self.0)?)
    }
}

/// `None` replies with `null`.
impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Result<Value, HandlerError> {
        self.map_or(Ok(Value::Null), IntoReply::into_reply)
    }
}

impl<T, E> IntoReply for Result<T, E>
where
    T: IntoReply,
    E: Into<HandlerError> + Send + 'static,
{
    fn into_reply(self) -> Result<Value, HandlerError> {
        self.map_err(Into::into)?.into_reply()
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for request handlers.
///
/// Automatically implemented for async functions whose parameters implement
/// [`FromRequest`] and whose return type implements [`IntoReply`].
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Call the handler with the given request.
    fn call(self, request: Arc<OutgoingRequest>) -> BoxFuture<'static, Result<Value, HandlerError>>;
}

/// Convert a handler function into a boxed handler.
///
/// Errors are logged with the request id and converted into the wire error
/// published to the caller.
pub fn into_handler<H, T>(handler: H) -> BoxedHandler
where
    H: Handler<T>,
    T: 'static,
{
    Arc::new(move |request: Arc<OutgoingRequest>| {
        let handler = handler.clone();
        async move {
            let id = request.id.clone();
            handler
                .call(request)
                .await
                .map_err(|e| report_error(&id, e))
        }
        .boxed()
    })
}

pub(crate) fn report_error(id: &str, err: HandlerError) -> switchyard_core::ResponseError {
    if err.is_internal() {
        error!(id = %id, error = %err, "Handler failed");
    } else {
        warn!(id = %id, error = %err, "Handler rejected request");
    }
    err.into_response_error()
}

// ============================================================================
// Handler implementations for functions (Axum-style)
// ============================================================================

/// Macro to generate Handler implementations for functions with different arities.
macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case, unused_variables)]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoReply,
            $( $ty: FromRequest + Send + 'static, )*
        {
            fn call(
                self,
                request: Arc<OutgoingRequest>,
            ) -> BoxFuture<'static, Result<Value, HandlerError>> {
                Box::pin(async move {
                    $(
                        let $ty = $ty::from_request(&request)?;
                    )*

                    (self)($($ty,)*).await.into_reply()
                })
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
