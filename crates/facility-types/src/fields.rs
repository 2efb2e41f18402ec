//! Helpers for pulling typed fields out of a loose JSON object.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Unwrap a request body into its top-level object.
pub fn into_object(value: Value) -> Result<Map<String, Value>, ValidationError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ValidationError::NotAnObject),
    }
}

/// Remove `key` and return it as a non-empty string, stored verbatim.
///
/// An absent key is `Ok(None)`. Explicit `null`, non-strings, blank
/// strings and strings with surrounding whitespace are rejected.
pub fn take_text(
    fields: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ValidationError> {
    match fields.remove(key) {
        None => Ok(None),
        Some(Value::String(s)) => {
            if s.trim().is_empty() {
                Err(ValidationError::invalid(key, "must not be empty"))
            } else if s.trim().len() != s.len() {
                Err(ValidationError::invalid(
                    key,
                    "must not have leading or trailing whitespace",
                ))
            } else {
                Ok(Some(s))
            }
        }
        Some(_) => Err(ValidationError::invalid(key, "must be a string")),
    }
}

/// Remove `key` and return it as a string that may be empty.
pub fn take_free_text(
    fields: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Option<String>, ValidationError> {
    match fields.remove(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ValidationError::invalid(key, "must be a string")),
    }
}

/// Remove `key` if it holds `null` or an empty string.
pub fn discard_blank(fields: &mut Map<String, Value>, key: &str) {
    if fields
        .get(key)
        .is_some_and(|v| v.is_null() || v.as_str().is_some_and(str::is_empty))
    {
        fields.remove(key);
    }
}

/// Remove `key` and deserialize it into `T`.
pub fn take_typed<T: DeserializeOwned>(
    fields: &mut Map<String, Value>,
    key: &'static str,
) -> Result<Option<T>, ValidationError> {
    fields
        .remove(key)
        .map(|value| {
            serde_json::from_value(value).map_err(|e| ValidationError::invalid(key, e.to_string()))
        })
        .transpose()
}
