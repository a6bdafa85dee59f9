//! Handler and service system for the Switchyard framework.
//!
//! - **Handler** ([`traits`]) – The [`Handler`] trait that adapts async
//!   functions with parameter injection, similar to Axum's system
//! - **Service** ([`service`]) – The [`HandlerService`] wrapper for composing
//!   handlers with tower layers, and [`from_service`] for registering any
//!   tower service as a handler
//!
//! ```text
//! async fn ──▶ Handler<T> ──into_handler──▶ BoxedHandler ──▶ HandlerRegistry
//!                  │                              ▲
//!                  └──▶ HandlerService ──layers──▶ from_service
//! ```

pub mod service;
pub mod traits;

pub use service::{HandlerService, from_service};
pub use traits::{Handler, IntoReply, Json, into_handler};

pub use tower::Layer;
