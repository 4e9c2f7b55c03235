//! JSON utility functions

use serde_json::Value as JsonValue;

/// Resolve a dot-separated path on a document
///
/// Arrays met along the way fan out: each object element is followed with
/// the remaining segments. Returns every value found, empty when the path
/// is absent. A present `null` counts as found.
pub fn resolve_path<'a>(doc: &'a JsonValue, path: &str) -> Vec<&'a JsonValue> {
    let mut current = vec![doc];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                JsonValue::Object(map) => {
                    if let Some(v) = map.get(segment) {
                        next.push(v);
                    }
                }
                JsonValue::Array(items) => {
                    for item in items {
                        if let Some(v) = item.as_object().and_then(|map| map.get(segment)) {
                            next.push(v);
                        }
                    }
                }
                _ => {}
            }
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }
    current
}

/// Values a comparison is tested against: each value, plus the elements of
/// any array value
pub fn comparison_candidates<'a>(values: &[&'a JsonValue]) -> Vec<&'a JsonValue> {
    let mut out = Vec::with_capacity(values.len());
    for &value in values {
        out.push(value);
        if let JsonValue::Array(items) = value {
            out.extend(items.iter());
        }
    }
    out
}

/// String payload of a plain string or of a `{"<tag>": "..."}` wrapper
pub fn tagged_str<'a>(value: &'a JsonValue, tag: &str) -> Option<&'a str> {
    match value {
        JsonValue::String(s) => Some(s.as_str()),
        JsonValue::Object(map) if map.len() == 1 => map.get(tag).and_then(|v| v.as_str()),
        _ => None,
    }
}
