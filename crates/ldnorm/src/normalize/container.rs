//! Multi-valued property handling.
//!
//! Every property is treated internally as an ordered sequence of values.
//! [`to_sequence`] and [`to_canonical`] are the only places that know about
//! the single-value/array split; clean, add, delete and merge all go through
//! them.

use tracing::debug;

use crate::identity::is_valid_record;
use crate::model::{ID_KEY, Record, RecordId, TYPE_KEY, Value};
use crate::normalize::compare::eq;

/// Views a property value as a sequence: absence is empty, an array is its
/// elements, anything else is a one-element sequence.
pub fn to_sequence(value: &Value) -> Vec<Value> {
    match value {
        Value::Undefined => Vec::new(),
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

/// Owned form of [`to_sequence`].
pub fn into_sequence(value: Value) -> Vec<Value> {
    match value {
        Value::Undefined => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Collapses a sequence to canonical form: empty is absent, one element is
/// that element, anything longer stays an array in the same order.
pub fn to_canonical(mut values: Vec<Value>) -> Value {
    match values.len() {
        0 => Value::Undefined,
        1 => values.pop().unwrap_or_default(),
        _ => Value::Array(values),
    }
}

/// Stores `values` under `key` in canonical form, removing the key when the
/// sequence is empty.
pub(crate) fn store_canonical(record: &mut Record, key: &str, values: Vec<Value>) {
    match to_canonical(values) {
        Value::Undefined => {
            record.remove(key);
        }
        value => {
            record.insert(key, value);
        }
    }
}

/// Appends one value (or each element of an array) to a property.
///
/// With `dedupe`, values already present are skipped, and so are repeats
/// within `values` itself; first-seen order is kept. Returns `None` if the
/// record has no valid `type`.
pub fn add(record: &Record, key: &str, values: impl Into<Value>, dedupe: bool) -> Option<Record> {
    if !is_valid_record(record) {
        debug!(key, "add declined: record has no valid type");
        return None;
    }

    let mut current = to_sequence(record.value(key));
    for value in into_sequence(values.into()) {
        if dedupe && current.iter().any(|existing| eq(existing, &value)) {
            continue;
        }
        current.push(value);
    }

    let mut updated = record.clone();
    store_canonical(&mut updated, key, current);
    Some(updated)
}

/// Removes every occurrence of `value` (or of each element, if an array) from
/// a property.
///
/// Removing the last value leaves an explicit empty array rather than
/// deleting the key, so "emptied" stays distinguishable from "never set".
/// A missing key is left missing. Returns `None` if the record has no valid
/// `type`.
pub fn delete(record: &Record, key: &str, value: &Value) -> Option<Record> {
    if !is_valid_record(record) {
        debug!(key, "delete declined: record has no valid type");
        return None;
    }
    if !record.contains_key(key) {
        return Some(record.clone());
    }

    let targets = to_sequence(value);
    let remaining: Vec<Value> = to_sequence(record.value(key))
        .into_iter()
        .filter(|existing| !targets.iter().any(|target| eq(existing, target)))
        .collect();

    let mut updated = record.clone();
    if remaining.is_empty() {
        updated.insert(key, Value::Array(Vec::new()));
    } else {
        store_canonical(&mut updated, key, remaining);
    }
    Some(updated)
}

/// Replaces the record's `id`. Returns `None` if the record has no valid
/// `type`.
pub fn set_id(record: &Record, id: impl Into<RecordId>) -> Option<Record> {
    if !is_valid_record(record) {
        debug!("set_id declined: record has no valid type");
        return None;
    }
    let mut updated = record.clone();
    updated.insert(ID_KEY, id.into().to_value());
    Some(updated)
}

/// Replaces the record's `type`. Returns `None` if the record has no valid
/// `type` to begin with.
pub fn set_type(record: &Record, type_name: impl Into<String>) -> Option<Record> {
    if !is_valid_record(record) {
        debug!("set_type declined: record has no valid type");
        return None;
    }
    let mut updated = record.clone();
    updated.insert(TYPE_KEY, type_name.into());
    Some(updated)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(json: serde_json::Value) -> Record {
        match Value::from(json) {
            Value::Object(record) => record,
            other => panic!("not an object: {other:?}"),
        }
    }

    fn strings(items: &[&str]) -> Value {
        Value::from(items.to_vec())
    }

    #[test]
    fn test_to_sequence() {
        assert!(to_sequence(&Value::Undefined).is_empty());
        assert_eq!(to_sequence(&Value::Null), vec![Value::Null]);
        assert_eq!(to_sequence(&"a".into()), vec![Value::from("a")]);
        assert_eq!(to_sequence(&strings(&["a", "b"])), vec![Value::from("a"), Value::from("b")]);
    }

    #[test]
    fn test_to_canonical() {
        assert_eq!(to_canonical(vec![]), Value::Undefined);
        assert_eq!(to_canonical(vec!["a".into()]), Value::from("a"));
        assert_eq!(to_canonical(vec!["b".into(), "a".into()]), strings(&["b", "a"]));
    }

    #[test]
    fn test_add_appends() {
        let obj = record(json!({"type": "Thing", "id": "t1", "tags": "red"}));
        let updated = add(&obj, "tags", "blue", false).unwrap();
        assert_eq!(updated.value("tags"), &strings(&["red", "blue"]));
        // Input untouched
        assert_eq!(obj.value("tags"), &Value::from("red"));

        let fresh = add(&obj, "colors", "green", false).unwrap();
        assert_eq!(fresh.value("colors"), &Value::from("green"));

        let dup = add(&obj, "tags", "red", false).unwrap();
        assert_eq!(dup.value("tags"), &strings(&["red", "red"]));
    }

    #[test]
    fn test_add_dedupe_keeps_first_seen_order() {
        let obj = record(json!({"type": "Thing", "id": "t1", "tags": ["red", "blue"]}));

        let same = add(&obj, "tags", "red", true).unwrap();
        assert_eq!(same.value("tags"), &strings(&["red", "blue"]));

        let merged = add(&obj, "tags", strings(&["red", "green", "blue"]), true).unwrap();
        assert_eq!(merged.value("tags"), &strings(&["red", "blue", "green"]));

        let repeats = add(&obj, "tags", strings(&["pink", "pink"]), true).unwrap();
        assert_eq!(repeats.value("tags"), &strings(&["red", "blue", "pink"]));
    }

    #[test]
    fn test_add_dedupes_records_by_identity() {
        let obj = record(json!({"type": "Person", "id": "p1", "knows": {"type": "Person", "id": "p2"}}));
        let again: Value = json!({"type": "Person", "id": "p2", "name": "Bob"}).into();
        let updated = add(&obj, "knows", again, true).unwrap();
        assert_eq!(updated, obj);
    }

    #[test]
    fn test_add_declines_invalid_record() {
        let untyped = record(json!({"id": "x"}));
        assert!(add(&untyped, "tags", "a", false).is_none());
    }

    #[test]
    fn test_delete_leaves_explicit_empty() {
        let obj = record(json!({"type": "Thing", "id": "t1", "color": "red"}));
        let updated = delete(&obj, "color", &"red".into()).unwrap();
        assert_eq!(updated.get("color"), Some(&Value::Array(vec![])));
        assert!(obj.contains_key("color"));
    }

    #[test]
    fn test_delete_all_occurrences() {
        let obj = record(json!({"type": "Thing", "id": "t1", "tags": ["a", "b", "a", "c"]}));
        let updated = delete(&obj, "tags", &"a".into()).unwrap();
        assert_eq!(updated.value("tags"), &strings(&["b", "c"]));

        let single = delete(&obj, "tags", &strings(&["a", "b"])).unwrap();
        assert_eq!(single.value("tags"), &Value::from("c"));
    }

    #[test]
    fn test_delete_by_identity() {
        let obj = record(json!({
            "type": "Person", "id": "p1",
            "knows": [{"type": "Person", "id": "p2"}, {"type": "Person", "id": "p3"}]
        }));
        let target: Value = json!({"type": "Person", "id": "p2", "name": "ignored"}).into();
        let updated = delete(&obj, "knows", &target).unwrap();
        assert_eq!(
            updated.value("knows"),
            &Value::from(json!({"type": "Person", "id": "p3"}))
        );
    }

    #[test]
    fn test_delete_missing_key_and_invalid() {
        let obj = record(json!({"type": "Thing", "id": "t1"}));
        let updated = delete(&obj, "tags", &"a".into()).unwrap();
        assert!(!updated.contains_key("tags"));

        assert!(delete(&record(json!({"type": null})), "tags", &"a".into()).is_none());
    }

    #[test]
    fn test_set_identity_keys() {
        let obj = record(json!({"type": "Thing", "id": "t1"}));
        let renamed = set_id(&obj, "t2").unwrap();
        assert_eq!(renamed.value("id"), &Value::from("t2"));
        let retyped = set_type(&obj, "Other").unwrap();
        assert_eq!(retyped.type_name(), Some("Other"));

        let untyped = record(json!({"name": "x"}));
        assert!(set_id(&untyped, "t2").is_none());
        assert!(set_type(&untyped, "Other").is_none());
    }
}
