//! Handler groups.
//!
//! A [`HandlerGroup`] collects related handlers, typically one per business
//! area, and registers them together. A group-level partial-match default
//! applies to every handler that does not set its own extras.
//!
//! ```rust,ignore
//! let books = HandlerGroup::named("books")
//!     .partial_match(true)
//!     .message(json!({ "httpMethod": "GET", "resource": "/books" }), list_books)
//!     .message(json!({ "httpMethod": "POST", "resource": "/books" }), create_book)
//!     .event("books.audit", audit);
//!
//! books.register_into(&mut registry)?;
//! ```

use std::sync::Arc;

use serde_json::Value;
use switchyard_core::{
    BoxedHandler, HandlerExtras, HandlerKind, HandlerRegistry, OutgoingRequest, Pattern,
    RegistryResult,
};
use tower::Service;
use tracing::debug;

use crate::error::HandlerError;
use crate::handler::{Handler, from_service, into_handler};

struct GroupEntry {
    pattern: Pattern,
    handler: BoxedHandler,
    kind: HandlerKind,
    extras: Option<HandlerExtras>,
}

/// An ordered set of handlers registered as a unit.
#[derive(Default)]
pub struct HandlerGroup {
    name: Option<String>,
    partial_match: bool,
    entries: Vec<GroupEntry>,
}

impl HandlerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the partial-match default for handlers of this group.
    pub fn partial_match(mut self, enabled: bool) -> Self {
        self.partial_match = enabled;
        self
    }

    /// Adds a request/reply handler.
    pub fn message<H, T>(self, pattern: impl Into<Pattern>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.push(pattern.into(), into_handler(handler), HandlerKind::Message, None)
    }

    /// Adds a request/reply handler with its own extras.
    pub fn message_with<H, T>(
        self,
        pattern: impl Into<Pattern>,
        handler: H,
        extras: HandlerExtras,
    ) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.push(
            pattern.into(),
            into_handler(handler),
            HandlerKind::Message,
            Some(extras),
        )
    }

    /// Adds an event-only handler.
    pub fn event<H, T>(self, pattern: impl Into<Pattern>, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.push(pattern.into(), into_handler(handler), HandlerKind::Event, None)
    }

    /// Adds a tower service as a request/reply handler.
    pub fn service<S>(self, pattern: impl Into<Pattern>, service: S) -> Self
    where
        S: Service<Arc<OutgoingRequest>, Response = Value> + Clone + Send + Sync + 'static,
        S::Error: Into<HandlerError>,
        S::Future: Send + 'static,
    {
        self.push(pattern.into(), from_service(service), HandlerKind::Message, None)
    }

    fn push(
        mut self,
        pattern: Pattern,
        handler: BoxedHandler,
        kind: HandlerKind,
        extras: Option<HandlerExtras>,
    ) -> Self {
        self.entries.push(GroupEntry {
            pattern,
            handler,
            kind,
            extras,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registers every handler in insertion order.
    ///
    /// Stops at the first duplicate pattern.
    pub fn register_into(self, registry: &mut HandlerRegistry) -> RegistryResult<usize> {
        let count = self.entries.len();
        let default_extras = HandlerExtras {
            partial_match: self.partial_match,
        };
        for entry in self.entries {
            registry.register(
                entry.pattern,
                entry.handler,
                entry.kind,
                entry.extras.unwrap_or(default_extras),
            )?;
        }
        debug!(
            group = self.name.as_deref().unwrap_or("<anonymous>"),
            count, "Registered handler group"
        );
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchyard_core::{RegistryError, Registration, Resolution};

    async fn ok() -> &'static str {
        "ok"
    }

    fn registration<'a>(registry: &'a HandlerRegistry, key: &str) -> &'a Registration {
        registry.iter().find(|r| r.key() == key).unwrap()
    }

    #[test]
    fn test_group_default_and_override() {
        let mut registry = HandlerRegistry::new();
        let count = HandlerGroup::named("books")
            .partial_match(true)
            .message(json!({ "resource": "/books" }), ok)
            .message_with(json!({ "resource": "/authors" }), ok, HandlerExtras::default())
            .event("books.audit", ok)
            .register_into(&mut registry)
            .unwrap();

        assert_eq!(count, 3);
        assert!(registration(&registry, r#"{"resource":"/books"}"#).partial_match());
        assert!(!registration(&registry, r#"{"resource":"/authors"}"#).partial_match());
        assert!(registration(&registry, "books.audit").is_event_handler());

        let message = Pattern::from(json!({ "resource": "/books", "httpMethod": "GET" }));
        assert!(matches!(registry.resolve(&message), Resolution::Message(_)));
    }

    #[test]
    fn test_group_duplicate_fails() {
        let mut registry = HandlerRegistry::new();
        let err = HandlerGroup::new()
            .message("a", ok)
            .event("a", ok)
            .register_into(&mut registry)
            .unwrap_err();
        assert_eq!(err, RegistryError::duplicate("a"));
    }
}
