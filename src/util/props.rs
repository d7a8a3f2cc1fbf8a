//! Path access into nested plain data.
//!
//! A path is a list of keys. Object members are looked up by key and array
//! elements by a decimal index key.

use serde_json::{Map, Value};

/// The value at `path`, or `None` if any step is missing.
///
/// An empty path returns `value` itself.
pub fn get_prop<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| child(current, key))
}

/// Set the value at `path`.
///
/// Missing intermediate object members are created as empty objects. Does
/// nothing if `value` or an intermediate is not an object or array, or an
/// array index is out of range.
pub fn set_prop(value: &mut Value, path: &[&str], new_value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = value;
    for key in parents {
        let Some(next) = child_or_insert(current, key) else {
            return;
        };
        current = next;
    }
    match current {
        Value::Object(map) => {
            map.insert(last.to_string(), new_value);
        }
        Value::Array(items) => {
            if let Some(slot) = index(last).and_then(|i| items.get_mut(i)) {
                *slot = new_value;
            }
        }
        _ => {}
    }
}

/// Remove the object member at `path`, then remove every parent object the
/// removal left empty. `value` itself is never removed.
///
/// Does nothing if a step is missing or is not an object.
pub fn delete_prop(value: &mut Value, path: &[&str]) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    let Value::Object(map) = value else {
        return;
    };
    if rest.is_empty() {
        map.remove(*first);
        return;
    }
    let Some(next) = map.get_mut(*first) else {
        return;
    };
    if !next.is_object() {
        return;
    }
    delete_prop(next, rest);
    if next.as_object().is_some_and(Map::is_empty) {
        map.remove(*first);
    }
}

/// Member values of an object, or elements of an array, in order.
pub fn get_object_values(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Object(map) => Some(map.values().collect()),
        Value::Array(items) => Some(items.iter().collect()),
        _ => None,
    }
}

fn index(key: &str) -> Option<usize> {
    key.parse().ok()
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => index(key).and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_or_insert<'a>(value: &'a mut Value, key: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(map) => Some(
            map.entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new())),
        ),
        Value::Array(items) => index(key).and_then(|i| items.get_mut(i)),
        _ => None,
    }
}
