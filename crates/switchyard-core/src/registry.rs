//! Handler registry and resolution.
//!
//! Registrations are kept in one ordered list. Each record carries its
//! normalized key, the original pattern and its flags; a key index serves the
//! exact-match fast path.
//!
//! # Resolution Order
//!
//! 1. Exact hit on the normalized key of the message pattern.
//! 2. First registration (in registration order) whose pattern
//!    [`matches`](crate::pattern::matches) the message under its own
//!    partial-match flag.
//! 3. The catch-all registration, if present.
//! 4. Nothing.
//!
//! The registry is built once before the broker starts accepting requests and
//! is read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{RegistryError, RegistryResult, ResponseError};
use crate::handler::{BoxedHandler, HandlerKind};
use crate::pattern::{Pattern, matches};

/// Per-registration options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerExtras {
    /// Accept messages whose pattern is a superset of the handler's.
    #[serde(default)]
    pub partial_match: bool,
}

impl HandlerExtras {
    pub fn partial() -> Self {
        Self {
            partial_match: true,
        }
    }

    /// Reads the known options from a free-form extras map.
    pub fn from_value(extras: &Value) -> Self {
        Self::deserialize(extras).unwrap_or_default()
    }
}

/// A stored handler with its pattern and flags.
#[derive(Clone)]
pub struct Registration {
    key: String,
    pattern: Pattern,
    handler: BoxedHandler,
    kind: HandlerKind,
    extras: HandlerExtras,
}

impl Registration {
    /// The normalized lookup key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The pattern as it was registered.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }

    pub fn kind(&self) -> HandlerKind {
        self.kind
    }

    pub fn is_event_handler(&self) -> bool {
        self.kind == HandlerKind::Event
    }

    pub fn partial_match(&self) -> bool {
        self.extras.partial_match
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("partial_match", &self.extras.partial_match)
            .finish_non_exhaustive()
    }
}

/// Outcome of resolving a message pattern.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    /// A handler that will produce a reply.
    Message(&'a Registration),
    /// An event-only handler qualified where a reply is expected.
    Event(&'a Registration),
    /// Nothing qualified.
    None,
}

impl<'a> Resolution<'a> {
    /// Converts the resolution into the handler to invoke or the wire error
    /// to publish.
    pub fn into_result(self) -> Result<&'a Registration, ResponseError> {
        match self {
            Self::Message(registration) => Ok(registration),
            Self::Event(_) => Err(ResponseError::illegal_event_handler()),
            Self::None => Err(ResponseError::no_handler_qualified()),
        }
    }
}

/// Ordered collection of handler registrations.
#[derive(Debug, Default)]
pub struct HandlerRegistry {
    registrations: Vec<Registration>,
    index: HashMap<String, usize>,
    catch_all: Option<usize>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `pattern`.
    ///
    /// Fails if another registration already owns the same normalized key,
    /// regardless of kind or flags.
    pub fn register(
        &mut self,
        pattern: impl Into<Pattern>,
        handler: BoxedHandler,
        kind: HandlerKind,
        extras: HandlerExtras,
    ) -> RegistryResult<()> {
        let pattern = pattern.into();
        let key = pattern.normalize();
        if self.index.contains_key(&key) {
            return Err(RegistryError::duplicate(key));
        }

        let position = self.registrations.len();
        if pattern.is_catch_all() {
            self.catch_all = Some(position);
        }
        debug!(
            pattern = %key,
            kind = ?kind,
            partial_match = extras.partial_match,
            "Registered handler"
        );

        self.index.insert(key.clone(), position);
        self.registrations.push(Registration {
            key,
            pattern,
            handler,
            kind,
            extras,
        });
        Ok(())
    }

    /// Resolves the registration that should handle `message`.
    pub fn resolve(&self, message: &Pattern) -> Resolution<'_> {
        let found = self
            .index
            .get(&message.normalize())
            .and_then(|&i| self.registrations.get(i))
            .or_else(|| {
                self.registrations
                    .iter()
                    .find(|r| matches(&r.pattern, message, r.extras.partial_match))
            })
            .or_else(|| self.catch_all.and_then(|i| self.registrations.get(i)));

        match found {
            Some(registration) if registration.is_event_handler() => {
                trace!(pattern = %registration.key, "Resolved event handler");
                Resolution::Event(registration)
            }
            Some(registration) => {
                trace!(pattern = %registration.key, "Resolved message handler");
                Resolution::Message(registration)
            }
            None => Resolution::None,
        }
    }

    /// Returns `true` if a registration owns the normalized form of `pattern`.
    pub fn contains(&self, pattern: &Pattern) -> bool {
        self.index.contains_key(&pattern.normalize())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registrations in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.registrations.iter()
    }
}
