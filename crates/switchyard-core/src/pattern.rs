//! Structural patterns and the matching engine.
//!
//! A [`Pattern`] describes the shape of messages a handler is interested in.
//! Patterns are plain data: primitives, ordered sequences and keyed mappings.
//!
//! # Matching
//!
//! [`matches`] compares a handler's pattern against a message pattern:
//!
//! | Handler     | Message     | Full match                              | Partial match                                    |
//! |-------------|-------------|-----------------------------------------|--------------------------------------------------|
//! | primitive   | primitive   | same type and value                     | same                                             |
//! | sequence    | sequence    | equal length, sorted pairwise match     | every handler element found in the message       |
//! | mapping     | mapping     | identical key sets, values match        | every handler key present with a matching value  |
//! | any other combination | | never                                   | never                                            |
//!
//! # Normalization
//!
//! [`Pattern::normalize`] produces the canonical string used as the registry's
//! fast-path key. Strings are kept verbatim so that a handler registered with a
//! pre-serialized pattern such as `{"cmd":"sum"}` is found by a mapping message
//! `{cmd: "sum"}`.
//!
//! ```rust,ignore
//! use serde_json::json;
//! use switchyard_core::{Pattern, matches};
//!
//! let handler = Pattern::from(json!({ "httpMethod": "GET" }));
//! let message = Pattern::from(json!({ "httpMethod": "GET", "resource": "/x" }));
//!
//! assert!(matches(&handler, &message, true));
//! assert!(!matches(&handler, &message, false));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// The distinguished catch-all pattern.
pub const CATCH_ALL: &str = "*";

/// A structural descriptor of a message.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Pattern {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<Pattern>),
    Mapping(BTreeMap<String, Pattern>),
}

impl Pattern {
    /// The catch-all pattern.
    pub fn catch_all() -> Self {
        Self::String(CATCH_ALL.to_string())
    }

    /// Returns `true` for the catch-all pattern.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Self::String(s) if s == CATCH_ALL)
    }

    /// Returns `true` for null, booleans, numbers and strings.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }

    /// Builds a mapping pattern from key/value pairs.
    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Pattern>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the value stored under `key` if this is a mapping.
    pub fn get(&self, key: &str) -> Option<&Pattern> {
        match self {
            Self::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the string if this is a string pattern.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the pattern back into a JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Value::Number(n.clone()),
            Self::String(s) => Value::String(s.clone()),
            Self::Sequence(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
        }
    }

    /// Produces the canonical lookup key for this pattern.
    ///
    /// Mappings serialize as `{"key":value,...}` with keys in sorted order,
    /// keys and nested string values written as escaped JSON strings; sequences serialize like mappings keyed by element
    /// index. Top-level strings are returned unquoted.
    pub fn normalize(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::String(s) => s.clone(),
            Self::Sequence(items) => normalize_entries(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item))
                    .collect(),
            ),
            Self::Mapping(map) => {
                normalize_entries(map.iter().map(|(k, v)| (k.clone(), v)).collect())
            }
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Number(_) => 2,
            Self::String(_) => 3,
            Self::Sequence(_) => 4,
            Self::Mapping(_) => 5,
        }
    }

    /// Total order used to sort sequence elements before comparison.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Null, Self::Null) => Ordering::Equal,
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => number_cmp(a, b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            (a, b) if a.rank() == b.rank() => a.normalize().cmp(&b.normalize()),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }
}

fn normalize_entries(mut entries: Vec<(String, &Pattern)>) -> String {
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    let body = entries
        .into_iter()
        .map(|(key, value)| {
            let key = Value::String(key);
            match value {
                Pattern::String(s) => format!("{key}:{}", Value::String(s.clone())),
                other => format!("{key}:{}", other.normalize()),
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{body}}}")
}

fn number_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn number_cmp(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    let x = a.as_f64().unwrap_or(f64::NAN);
    let y = b.as_f64().unwrap_or(f64::NAN);
    x.total_cmp(&y)
}

fn primitive_eq(a: &Pattern, b: &Pattern) -> bool {
    match (a, b) {
        (Pattern::Null, Pattern::Null) => true,
        (Pattern::Bool(x), Pattern::Bool(y)) => x == y,
        (Pattern::Number(x), Pattern::Number(y)) => number_eq(x, y),
        (Pattern::String(x), Pattern::String(y)) => x == y,
        _ => false,
    }
}

// =============================================================================
// Matching
// =============================================================================

/// Decides whether `message` qualifies for a handler declared with `handler`.
pub fn matches(handler: &Pattern, message: &Pattern, partial: bool) -> bool {
    match (handler, message) {
        (Pattern::Sequence(h), Pattern::Sequence(m)) => sequence_matches(h, m, partial),
        (Pattern::Mapping(h), Pattern::Mapping(m)) => mapping_matches(h, m, partial),
        (h, m) if h.is_primitive() && m.is_primitive() => primitive_eq(h, m),
        _ => false,
    }
}

fn sorted(items: &[Pattern]) -> Vec<&Pattern> {
    let mut sorted: Vec<&Pattern> = items.iter().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn sequence_matches(handler: &[Pattern], message: &[Pattern], partial: bool) -> bool {
    if partial {
        // Handler elements form a minimum required subset of the message.
        return sorted(handler).into_iter().all(|wanted| {
            if wanted.is_primitive() {
                message.iter().any(|candidate| primitive_eq(wanted, candidate))
            } else {
                message
                    .iter()
                    .any(|candidate| matches(wanted, candidate, true))
            }
        });
    }

    handler.len() == message.len()
        && sorted(handler)
            .into_iter()
            .zip(sorted(message))
            .all(|(h, m)| matches(h, m, false))
}

fn mapping_matches(
    handler: &BTreeMap<String, Pattern>,
    message: &BTreeMap<String, Pattern>,
    partial: bool,
) -> bool {
    if partial {
        return handler.iter().all(|(key, wanted)| {
            message
                .get(key)
                .is_some_and(|candidate| matches(wanted, candidate, true))
        });
    }

    handler.len() == message.len()
        && message.iter().all(|(key, candidate)| {
            handler
                .get(key)
                .is_some_and(|wanted| matches(wanted, candidate, false))
        })
}

// =============================================================================
// Conversions
// =============================================================================

impl From<Value> for Pattern {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&Value> for Pattern {
    fn from(value: &Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Pattern {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Pattern {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for Pattern {
    fn from(n: i32) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Pattern {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<Vec<Pattern>> for Pattern {
    fn from(items: Vec<Pattern>) -> Self {
        Self::Sequence(items)
    }
}

impl From<BTreeMap<String, Pattern>> for Pattern {
    fn from(map: BTreeMap<String, Pattern>) -> Self {
        Self::Mapping(map)
    }
}

impl<T: Into<Pattern>> From<Option<T>> for Pattern {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalize())
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

// =============================================================================
// Tests
// =============================================================================
