// ABOUTME: Dotted field-path resolution over JSON values
// ABOUTME: Walks objects by key and arrays by numeric index, rendering hits as text

use serde_json::Value;

pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('.').filter(|segment| !segment.is_empty())
}

/// Follow `segments` down from `root`. Numeric segments index into arrays.
pub fn walk<'a, 'p>(root: &'a Value, segments: impl Iterator<Item = &'p str>) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Resolve `path` (for example `context.owner.id`) against `root`.
pub fn resolve<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    walk(root, segments(path))
}

/// Text form of a resolved value. Null renders as nothing.
pub fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
