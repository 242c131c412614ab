//! Pruning of absent values.
//!
//! `null` is a value and survives; [`Value::Undefined`] is absence and is
//! removed. Arrays are collapsed with the same canonical rule as any other
//! multi-valued property.

use crate::model::{Record, Value, is_identity_key};
use crate::normalize::container::to_canonical;

/// Returns a copy of `value` with absent members removed, recursively.
///
/// - Objects drop every key whose value is or cleans to `Undefined`. The
///   `type` and `id` keys are kept untouched, whatever they hold.
/// - Arrays are cleaned element-wise; elements that clean to `Undefined` or
///   to an empty object are dropped, and the rest is canonicalized (empty is
///   `Undefined`, a single element is unwrapped).
/// - Everything else is returned as is.
///
/// `clean(&clean(x)) == clean(x)` for every `x`.
pub fn clean(value: &Value) -> Value {
    match value {
        Value::Object(record) => Value::Object(clean_record(record)),
        Value::Array(items) => clean_array(items),
        other => other.clone(),
    }
}

/// Record form of [`clean`].
pub fn clean_record(record: &Record) -> Record {
    record
        .iter()
        .filter_map(|(key, value)| {
            if is_identity_key(key) {
                return Some((key.clone(), value.clone()));
            }
            match clean(value) {
                Value::Undefined => None,
                cleaned => Some((key.clone(), cleaned)),
            }
        })
        .collect()
}

fn clean_array(items: &[Value]) -> Value {
    let kept = items
        .iter()
        .map(clean)
        .filter(|item| match item {
            Value::Undefined => false,
            Value::Object(record) => !record.is_empty(),
            _ => true,
        })
        .collect();
    to_canonical(kept)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_clean_drops_undefined_keeps_null() {
        let mut record = Record::with_identity("Person", "p1");
        record.insert("gone", Value::Undefined);
        record.insert("nothing", Value::Null);
        record.insert("name", "Alice");

        let cleaned = clean_record(&record);
        assert!(!cleaned.contains_key("gone"));
        assert_eq!(cleaned.get("nothing"), Some(&Value::Null));
        assert_eq!(cleaned.value("name"), &Value::from("Alice"));
        // Input untouched
        assert!(record.contains_key("gone"));
    }

    #[test]
    fn test_clean_preserves_identity_keys() {
        let mut record = Record::new();
        record.insert("type", Value::Null);
        record.insert("id", Value::Undefined);
        record.insert("x", Value::Undefined);

        let cleaned = clean_record(&record);
        assert_eq!(cleaned.get("type"), Some(&Value::Null));
        assert_eq!(cleaned.get("id"), Some(&Value::Undefined));
        assert!(!cleaned.contains_key("x"));
    }

    #[test]
    fn test_clean_empty_array_is_undefined() {
        assert_eq!(clean(&Value::Array(vec![])), Value::Undefined);
        assert_eq!(clean(&Value::Array(vec![Value::Undefined])), Value::Undefined);
    }

    #[test]
    fn test_clean_array_of_objects() {
        let mut empty_after_clean = Record::new();
        empty_after_clean.insert("x", Value::Undefined);
        let person: Value = json!({"type": "Person", "id": "p1"}).into();

        let one = Value::Array(vec![Value::Object(empty_after_clean.clone()), person.clone()]);
        assert_eq!(clean(&one), person);

        let two = Value::Array(vec![person.clone(), Value::Object(Record::new()), person.clone()]);
        assert_eq!(clean(&two), Value::Array(vec![person.clone(), person]));
    }

    #[test]
    fn test_clean_nested() {
        let mut inner = Record::new();
        inner.insert("keep", 1);
        inner.insert("drop", Value::Undefined);
        let mut outer = Record::with_identity("Thing", "t1");
        outer.insert("inner", inner);
        outer.insert("list", Value::Array(vec![Value::Array(vec![]), "only".into()]));
        outer.insert("empty", Value::Array(vec![]));

        let cleaned = clean_record(&outer);
        assert_eq!(cleaned.value("inner"), &Value::from(json!({"keep": 1})));
        assert_eq!(cleaned.value("list"), &Value::from("only"));
        assert!(!cleaned.contains_key("empty"));
    }

    #[test]
    fn test_clean_primitives_pass_through() {
        for value in [Value::Null, Value::Undefined, Value::from(3), Value::from("s"), Value::from(true)] {
            assert_eq!(clean(&value), value);
        }
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Undefined),
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            (-5i64..5).prop_map(Value::from),
            "[a-c]{0,2}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 48, 5, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
                prop::collection::vec((prop::sample::select(vec!["type", "id", "a", "b", "c"]), inner), 0..5)
                    .prop_map(|pairs| {
                        let mut record = Record::new();
                        for (key, value) in pairs {
                            record.insert(key, value);
                        }
                        Value::Object(record)
                    }),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_clean_is_idempotent(value in arb_value()) {
            let once = clean(&value);
            prop_assert_eq!(clean(&once), once);
        }
    }
}
