//! Acknowledgements returned to the calling platform.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Value, json};

/// Field name under which batch failures are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchFailureKey {
    #[default]
    #[serde(rename = "failedItems")]
    FailedItems,
    #[serde(rename = "batchItemFailures")]
    BatchItemFailures,
}

impl BatchFailureKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FailedItems => "failedItems",
            Self::BatchItemFailures => "batchItemFailures",
        }
    }
}

/// One failed batch item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FailedItem {
    #[serde(rename = "itemIdentifier")]
    pub item_identifier: String,
}

/// Failed item identifiers of a batch, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFailures {
    key: BatchFailureKey,
    items: Vec<FailedItem>,
}

impl BatchFailures {
    pub fn new<I, S>(key: BatchFailureKey, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items: Vec<FailedItem> = identifiers
            .into_iter()
            .map(|id| FailedItem {
                item_identifier: id.into(),
            })
            .collect();
        items.sort();
        Self { key, items }
    }

    pub fn key(&self) -> BatchFailureKey {
        self.key
    }

    pub fn items(&self) -> &[FailedItem] {
        &self.items
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.item_identifier.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The trigger-specific result of dispatching one raw event.
#[derive(Debug, Clone, PartialEq)]
pub enum Acknowledgement {
    /// Fire-and-forget triggers return nothing.
    Empty,
    /// Single-item request/reply.
    Reply(Value),
    /// Multi-item request/reply, in request order.
    Replies(Vec<Value>),
    /// Partial batch failure report.
    BatchFailures(BatchFailures),
}

impl Acknowledgement {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Converts into the JSON value handed back to the platform.
    pub fn into_value(self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Reply(value) => value,
            Self::Replies(values) => Value::Array(values),
            Self::BatchFailures(failures) => {
                let mut body = serde_json::Map::new();
                body.insert(failures.key.as_str().to_string(), json!(failures.items));
                Value::Object(body)
            }
        }
    }
}

impl Serialize for Acknowledgement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.clone().into_value().serialize(serializer)
    }
}
