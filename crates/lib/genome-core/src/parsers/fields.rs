//! Ordered-candidate field lookup for loosely specified JSON documents.
//!
//! Upstream schemas move fields around between versions and classification
//! schemes. Callers describe every known location as a path, most preferred
//! first, and take the first one that holds a usable value.

use serde_json::Value;

/// Follows `path` through nested objects.
#[must_use]
pub fn lookup<'a>(doc: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |node, key| node.get(key))
}

/// Trimmed text at `path`. Numbers are rendered; blank strings count as absent.
#[must_use]
pub fn text_at(doc: &Value, path: &[&str]) -> Option<String> {
    match lookup(doc, path)? {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Text from the first candidate path that yields any.
#[must_use]
pub fn first_text(doc: &Value, candidates: &[&[&str]]) -> Option<String> {
    candidates.iter().find_map(|path| text_at(doc, path))
}

/// Normalizes a value that may be a single object or an array of objects.
#[must_use]
pub fn as_list(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Id list whose entries may be JSON strings or numbers.
#[must_use]
pub fn id_list(value: &Value) -> Vec<String> {
    as_list(value)
        .into_iter()
        .filter_map(|item| match item {
            Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
        .collect()
}
