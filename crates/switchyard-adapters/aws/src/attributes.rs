//! Message attribute coercion.
//!
//! SNS and SQS attributes arrive as a declared data type plus a string
//! value. Patterns are built from the decoded values so that handlers can
//! match on numbers and structured data rather than on their encodings.

use serde_json::Value;
use switchyard_core::{AdapterError, AdapterResult, Pattern};

/// Decodes one attribute value according to its declared data type.
///
/// | type           | empty / absent | value                                  |
/// |----------------|----------------|----------------------------------------|
/// | `String`       | `""`           | decoded JSON, else the raw string      |
/// | `String.Array` | `[]`           | decoded JSON array                     |
/// | `Number`       | `0`            | decoded JSON number                    |
///
/// Every other type, `Binary` included, is rejected.
pub fn coerce(name: &str, data_type: &str, value: Option<&str>) -> AdapterResult<Value> {
    let value = value.filter(|v| !v.is_empty());
    match data_type {
        "String" => Ok(match value {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.into())),
            None => Value::String(String::new()),
        }),
        "String.Array" => match value {
            Some(raw) => match serde_json::from_str(raw) {
                Ok(array @ Value::Array(_)) => Ok(array),
                Ok(_) => Err(AdapterError::invalid_attribute(name, "expected a JSON array")),
                Err(e) => Err(AdapterError::invalid_attribute(name, e)),
            },
            None => Ok(Value::Array(Vec::new())),
        },
        "Number" => match value {
            Some(raw) => match serde_json::from_str(raw) {
                Ok(number @ Value::Number(_)) => Ok(number),
                Ok(_) => Err(AdapterError::invalid_attribute(name, "expected a number")),
                Err(e) => Err(AdapterError::invalid_attribute(name, e)),
            },
            None => Ok(Value::from(0)),
        },
        other => Err(AdapterError::AttributeTypeNotImplemented {
            data_type: other.to_string(),
        }),
    }
}

/// Builds a mapping pattern from `(name, data type, value)` triples.
pub fn attributes_pattern<'a, I>(attributes: I) -> AdapterResult<Pattern>
where
    I: IntoIterator<Item = (&'a str, &'a str, Option<&'a str>)>,
{
    let entries = attributes
        .into_iter()
        .map(|(name, data_type, value)| Ok((name, coerce(name, data_type, value)?)))
        .collect::<AdapterResult<Vec<_>>>()?;
    Ok(Pattern::mapping(entries))
}
