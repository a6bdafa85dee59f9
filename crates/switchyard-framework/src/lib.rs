//! # Switchyard Framework
//!
//! High-level components for building message handlers on top of the core.
//!
//! This layer provides:
//! - Handler trait for Axum-style extraction from requests
//! - Tower integration so handlers can be wrapped in layers
//! - Handler groups with shared registration defaults
//! - The [`Server`] consumer loop and the [`Client`] dispatch entry point

pub mod client;
pub mod error;
pub mod extractor;
pub mod group;
pub mod handler;
pub mod server;

pub use client::Client;
pub use error::{ExtractError, ExtractResult, HandlerError, HandlerResult};
pub use extractor::{Context, FromRequest, MessagePattern, Payload, RequestId};
pub use group::HandlerGroup;
pub use handler::{Handler, HandlerService, IntoReply, Json, from_service, into_handler};
pub use server::{Server, ServerOptions, handle_request};
