//! Lenient readers for untyped JSON fields.
//!
//! Site payloads mix numbers and numeric strings, and use several names for
//! the same field. These helpers are shared by the record normalizer and the
//! fallback strategies.

use serde_json::Value;

/// Returns the first of `keys` whose value is a non-blank string or a number,
/// trimmed.
pub(crate) fn first_text(object: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| object.get(key))
        .find_map(text)
}

/// Returns the first of `keys` that is present and not null.
pub(crate) fn first_present<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(key))
        .find(|value| !value.is_null())
}

/// A non-blank string (trimmed) or a number rendered as text.
pub(crate) fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A number, or a string holding one. A decimal comma is accepted.
pub(crate) fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

/// A non-negative integer, or a string holding one.
pub(crate) fn count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Strings from a string, or from a list of strings and `{name}` objects.
pub(crate) fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(_) => first_text(item, &["name", "title", "label"]),
                other => text(other),
            })
            .collect(),
        other => text(other).into_iter().collect(),
    }
}

/// Collapses runs of whitespace into single spaces; `None` if nothing is left.
pub(crate) fn collapse_whitespace(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}
