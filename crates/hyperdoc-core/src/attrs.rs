//! Lenient attribute extraction
//!
//! Documents, items and links are decoded from plain JSON objects. A known
//! key is lifted into its typed field only when the value has the expected
//! shape; otherwise it stays in the object's extra attributes untouched, so
//! an odd value never makes the whole document undecodable.

use serde_json::{Map, Value};

/// Take `key` if it holds a string
pub(crate) fn take_string(attrs: &mut Map<String, Value>, key: &str) -> Option<String> {
    match attrs.get(key) {
        Some(Value::String(_)) => match attrs.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Take `key` if it holds anything but `null`
pub(crate) fn take_value(attrs: &mut Map<String, Value>, key: &str) -> Option<Value> {
    match attrs.get(key) {
        Some(Value::Null) | None => None,
        Some(_) => attrs.remove(key),
    }
}

/// Take `key` if `accept` approves its value
pub(crate) fn take_if<T>(
    attrs: &mut Map<String, Value>,
    key: &str,
    accept: impl FnOnce(&Value) -> bool,
    convert: impl FnOnce(Value) -> T,
) -> Option<T> {
    if !attrs.get(key).is_some_and(accept) {
        return None;
    }
    attrs.remove(key).map(convert)
}

/// Write a typed field back, overriding any extra attribute of the same name
pub(crate) fn put(attrs: &mut Map<String, Value>, key: &str, value: Option<impl Into<Value>>) {
    if let Some(value) = value {
        attrs.insert(key.to_string(), value.into());
    }
}

/// An array whose elements are all JSON objects
pub(crate) fn is_object_array(value: &Value) -> bool {
    matches!(value, Value::Array(entries) if entries.iter().all(Value::is_object))
}

/// Elements of an array of objects (anything else yields nothing)
pub(crate) fn objects(value: Value) -> impl Iterator<Item = Map<String, Value>> {
    let entries = match value {
        Value::Array(entries) => entries,
        _ => Vec::new(),
    };
    entries.into_iter().filter_map(|entry| match entry {
        Value::Object(attrs) => Some(attrs),
        _ => None,
    })
}
