//! Deep comparison and canonical hashing of plain data.

use serde_json::{Map, Value};

/// Recursively compare two values.
///
/// Objects and arrays are compared member by member. `null` at the top level
/// behaves like an empty object. A `null` member matches a `null`, object or
/// array member at the same key. With `asymmetrical` set, only checks that
/// every member of `a` is present and equal in `b` (`a` is a subset of `b`).
pub fn compare(a: &Value, b: &Value, asymmetrical: bool) -> bool {
    if a == b {
        return true;
    }
    let (Some(a_members), true) = (members(a), is_container(b)) else {
        return false;
    };

    for (key, a_value) in a_members {
        let Some(b_value) = member(b, &key) else {
            return false;
        };
        if a_value == b_value {
            continue;
        }
        if kind(a_value) != kind(b_value) {
            return false;
        }
        match a_value {
            Value::Object(_) | Value::Array(_) => {
                if !compare(a_value, b_value, true) {
                    return false;
                }
            }
            // A null member matches any object-like member.
            Value::Null => {}
            // Equal-kind primitives that are not equal.
            _ => return false,
        }
    }

    asymmetrical || compare(b, a, true)
}

/// Canonical string form of a value: JSON with object keys sorted.
///
/// Two values that differ only in key order hash the same.
pub fn get_hash(value: &Value) -> String {
    sort_keys(value).to_string()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.clone(), sort_keys(v));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

fn is_container(v: &Value) -> bool {
    matches!(v, Value::Null | Value::Object(_) | Value::Array(_))
}

fn members(v: &Value) -> Option<Vec<(String, &Value)>> {
    match v {
        Value::Null => Some(Vec::new()),
        Value::Object(map) => Some(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
        Value::Array(items) => Some(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v))
                .collect(),
        ),
        _ => None,
    }
}

fn member<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    match v {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Coarse type tag; objects, arrays and null share one, as in `typeof`.
fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null | Value::Object(_) | Value::Array(_) => "object",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
    }
}
