//! Loading characters from stored records.
//!
//! Records written by older versions of the sheet may be missing fields or
//! carry values of the wrong shape. A record never fails to load: each field
//! that fits the model is kept, everything else takes its default.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::character_sheet::Character;

impl Character {
    /// Build a character from a stored record.
    ///
    /// Fields are merged one at a time over [`Character::default`]. A field
    /// whose value does not fit (wrong type, out of range, malformed id)
    /// keeps its default. List entries are merged over the default entry at
    /// the same position, or over an empty entry past the end of the
    /// defaults. Derived fields are left as stored; call
    /// [`recompute`](crate::recompute) afterwards.
    pub fn from_record(record: Map<String, Value>) -> Self {
        let mut merged = match serde_json::to_value(Character::default()) {
            Ok(value) => value,
            Err(_) => return Character::default(),
        };
        for (key, value) in record {
            merge_field(&mut merged, "", &key, value);
        }
        Character::deserialize(&merged).unwrap_or_default()
    }
}

fn fits(root: &Value) -> bool {
    Character::deserialize(root).is_ok()
}

fn child(pointer: &str, key: &str) -> String {
    format!("{}/{}", pointer, key.replace('~', "~0").replace('/', "~1"))
}

/// Merge `value` into the object at `parent` under `key`.
fn merge_field(root: &mut Value, parent: &str, key: &str, value: Value) {
    let existing = root.pointer(parent).and_then(|node| node.get(key));
    let nested = matches!((existing, &value), (Some(Value::Object(_)), Value::Object(_)));
    let list = matches!((existing, &value), (Some(Value::Array(_)), Value::Array(_)));

    match value {
        Value::Object(fields) if nested => {
            let pointer = child(parent, key);
            for (field, value) in fields {
                merge_field(root, &pointer, &field, value);
            }
        }
        Value::Array(items) if list => merge_items(root, &child(parent, key), items),
        value => {
            let Some(fields) = root.pointer_mut(parent).and_then(Value::as_object_mut) else {
                return;
            };
            let previous = fields.insert(key.to_string(), value);
            if fits(root) {
                return;
            }
            if let Some(fields) = root.pointer_mut(parent).and_then(Value::as_object_mut) {
                match previous {
                    Some(previous) => {
                        fields.insert(key.to_string(), previous);
                    }
                    None => {
                        fields.remove(key);
                    }
                }
            }
        }
    }
}

/// Replace the list at `pointer` with `items`, merged entry by entry.
fn merge_items(root: &mut Value, pointer: &str, items: Vec<Value>) {
    let defaults = match root.pointer_mut(pointer).and_then(Value::as_array_mut) {
        Some(list) => std::mem::take(list),
        None => return,
    };

    for (index, item) in items.into_iter().enumerate() {
        let base = defaults
            .get(index)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        let Some(position) = push(root, pointer, base) else {
            return;
        };
        if !fits(root) {
            pop(root, pointer);
            continue;
        }

        match item {
            Value::Object(fields) => {
                let entry = child(pointer, &position.to_string());
                for (field, value) in fields {
                    merge_field(root, &entry, &field, value);
                }
            }
            other => {
                pop(root, pointer);
                push(root, pointer, other);
                if !fits(root) {
                    pop(root, pointer);
                }
            }
        }
    }
}

fn push(root: &mut Value, pointer: &str, value: Value) -> Option<usize> {
    let list = root.pointer_mut(pointer).and_then(Value::as_array_mut)?;
    list.push(value);
    Some(list.len() - 1)
}

fn pop(root: &mut Value, pointer: &str) {
    if let Some(list) = root.pointer_mut(pointer).and_then(Value::as_array_mut) {
        list.pop();
    }
}
