//! Extractor system for the Switchyard framework.
//!
//! This module provides the [`FromRequest`] trait, which defines how types
//! can be extracted from an incoming request for use as handler parameters.
//!
//! ```rust,ignore
//! use switchyard_framework::{Payload, RequestId};
//!
//! #[derive(serde::Deserialize)]
//! struct NewBook {
//!     title: String,
//! }
//!
//! async fn create_book(RequestId(id): RequestId, Payload(book): Payload<NewBook>) -> String {
//!     format!("{id}: {}", book.title)
//! }
//! ```

use std::ops::Deref;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use switchyard_core::{InvocationContext, OutgoingRequest, Pattern};

use crate::error::{ExtractError, ExtractResult};

/// A trait for types that can be extracted from an incoming request.
///
/// When extraction fails the handler is not called and the caller receives
/// the extraction error.
pub trait FromRequest: Sized {
    fn from_request(request: &Arc<OutgoingRequest>) -> ExtractResult<Self>;
}

/// The request payload, deserialized into `T`.
#[derive(Debug, Clone)]
pub struct Payload<T>(pub T);

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: DeserializeOwned> FromRequest for Payload<T> {
    fn from_request(request: &Arc<OutgoingRequest>) -> ExtractResult<Self> {
        serde_json::from_value(request.data.clone())
            .map(Payload)
            .map_err(|e| ExtractError::InvalidPayload {
                expected: std::any::type_name::<T>(),
                reason: e.to_string(),
            })
    }
}

/// The correlation id of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl FromRequest for RequestId {
    fn from_request(request: &Arc<OutgoingRequest>) -> ExtractResult<Self> {
        Ok(Self(request.id.clone()))
    }
}

/// The pattern the request was dispatched with.
#[derive(Debug, Clone, PartialEq)]
pub struct MessagePattern(pub Pattern);

impl FromRequest for MessagePattern {
    fn from_request(request: &Arc<OutgoingRequest>) -> ExtractResult<Self> {
        Ok(Self(request.pattern.clone()))
    }
}

/// The invocation context of the raw event that produced the request.
#[derive(Debug, Clone)]
pub struct Context(pub InvocationContext);

impl Deref for Context {
    type Target = InvocationContext;

    fn deref(&self) -> &InvocationContext {
        &self.0
    }
}

impl FromRequest for Context {
    fn from_request(request: &Arc<OutgoingRequest>) -> ExtractResult<Self> {
        Ok(Self(request.context.clone()))
    }
}

/// The raw payload.
impl FromRequest for Value {
    fn from_request(request: &Arc<OutgoingRequest>) -> ExtractResult<Self> {
        Ok(request.data.clone())
    }
}

/// The whole request.
impl FromRequest for Arc<OutgoingRequest> {
    fn from_request(request: &Arc<OutgoingRequest>) -> ExtractResult<Self> {
        Ok(request.clone())
    }
}

/// Optional parameters never fail; a failed extraction yields `None`.
impl<T: FromRequest> FromRequest for Option<T> {
    fn from_request(request: &Arc<OutgoingRequest>) -> ExtractResult<Self> {
        Ok(T::from_request(request).ok())
    }
}
