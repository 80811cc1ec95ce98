use serde_json::{Map, Value};

/// Flatten nested objects into dotted keys (`inputs.principal`). Arrays are
/// left in place for the caller to render separately.
pub fn flatten_object(map: &Map<String, Value>) -> Vec<(String, Value)> {
    let mut out = Vec::with_capacity(map.len());
    flatten_into("", map, &mut out);
    out
}

fn flatten_into(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, Value)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_into(&name, inner, out),
            other => out.push((name, other.clone())),
        }
    }
}

/// True for a non-empty array whose first element is an object.
pub fn is_record_array(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if is_records(arr))
}

pub fn is_records(arr: &[Value]) -> bool {
    matches!(arr.first(), Some(Value::Object(_)))
}

/// Column headers and flattened rows for an array of objects.
pub fn records(arr: &[Value]) -> (Vec<String>, Vec<Vec<Value>>) {
    let Some(Value::Object(first)) = arr.first() else {
        return (Vec::new(), Vec::new());
    };
    let headers: Vec<String> = flatten_object(first).into_iter().map(|(k, _)| k).collect();

    let rows = arr
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => {
                let flat = flatten_object(map);
                Some(
                    headers
                        .iter()
                        .map(|h| {
                            flat.iter()
                                .find(|(k, _)| k == h)
                                .map(|(_, v)| v.clone())
                                .unwrap_or(Value::Null)
                        })
                        .collect(),
                )
            }
            _ => None,
        })
        .collect();

    (headers, rows)
}
