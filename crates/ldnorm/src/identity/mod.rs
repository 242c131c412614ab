//! Record identity: extraction, validity, and comparison of `(type, id)`.
//!
//! A record is *valid* (addressable) when its `type` is a non-empty string.
//! It has an *identity* when it is valid and also carries a well-formed `id`.
//! Nothing other than the `type` and `id` keys is ever used to infer identity.

use tracing::trace;

use crate::error::IdentityError;
use crate::model::{ID_KEY, IdGenerator, Record, RecordId, Reference, Value};

/// The identity view of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Not a record, or a record without a complete identity.
    Absent,
    /// A single identified record.
    One(Reference),
    /// An array, mapped element-wise. Position is preserved and elements
    /// without identity are `None`.
    Many(Vec<Option<Reference>>),
}

impl Identity {
    pub fn is_absent(&self) -> bool {
        matches!(self, Identity::Absent)
    }

    /// Returns the single reference, if this is [`Identity::One`].
    pub fn into_reference(self) -> Option<Reference> {
        match self {
            Identity::One(reference) => Some(reference),
            _ => None,
        }
    }
}

/// Returns the identity of a record, or of each element of an array.
pub fn identity_of(value: &Value) -> Identity {
    match value {
        Value::Array(items) => Identity::Many(items.iter().map(reference_of).collect()),
        other => reference_of(other).map_or(Identity::Absent, Identity::One),
    }
}

/// Returns the reference of a single identified record.
pub fn reference_of(value: &Value) -> Option<Reference> {
    value.as_object().and_then(Reference::from_record)
}

/// Returns true if `value` is a single object with a non-empty string `type`.
///
/// The `id` is not required; an anonymous record can be given one later.
pub fn is_valid(value: &Value) -> bool {
    value.as_object().is_some_and(is_valid_record)
}

/// Record form of [`is_valid`].
pub fn is_valid_record(record: &Record) -> bool {
    record.type_name().is_some_and(|t| !t.is_empty())
}

/// A one-element array stands for its bare element.
pub(crate) fn unwrap_single(value: &Value) -> &Value {
    match value {
        Value::Array(items) if items.len() == 1 => &items[0],
        other => other,
    }
}

/// Returns true if both values resolve to the same `(type, id)`.
///
/// Arrays are compared position by position and must have equal lengths,
/// except that a one-element array is treated as its element on either side.
/// A missing identity on either side never matches.
pub fn is_same_identity(a: &Value, b: &Value) -> bool {
    match (unwrap_single(a), unwrap_single(b)) {
        (Value::Array(xs), Value::Array(ys)) => {
            !xs.is_empty()
                && xs.len() == ys.len()
                && xs.iter().zip(ys).all(|(x, y)| is_same_identity(x, y))
        }
        (Value::Array(_), _) | (_, Value::Array(_)) => false,
        (x, y) => match (reference_of(x), reference_of(y)) {
            (Some(rx), Some(ry)) => rx == ry,
            _ => false,
        },
    }
}

/// Gives an anonymous record a fresh id.
///
/// A record is anonymous when its `id` is missing, `null`, `""`, or a
/// sequence holding only such values. Unlike every other operation here this
/// one fails loudly: asking for an identity on something that is not an
/// object, or that already has an id (well-formed or not), is a caller error.
pub fn assign_identity<G: IdGenerator>(value: &Value, ids: &mut G) -> Result<Record, IdentityError> {
    let record = value.as_object().ok_or(IdentityError::NotAnObject { kind: value.kind() })?;
    assign_record_identity(record, ids)
}

/// Record form of [`assign_identity`].
pub fn assign_record_identity<G: IdGenerator>(record: &Record, ids: &mut G) -> Result<Record, IdentityError> {
    match record.id() {
        Some(id) if !is_blank_id(id) => {
            let type_name = record.type_name().map(str::to_string);
            let id_text = id.to_json().to_string();
            Err(match RecordId::from_value(id) {
                Some(_) => IdentityError::AlreadyIdentified { type_name, id: id_text },
                None => IdentityError::MalformedId { type_name, id: id_text },
            })
        }
        _ => Ok(with_fresh_id(record, ids)),
    }
}

/// Returns a copy of `record` whose `id` is a fresh one, whatever it held.
pub(crate) fn with_fresh_id<G: IdGenerator>(record: &Record, ids: &mut G) -> Record {
    let mut assigned = record.clone();
    let id = ids.next_id();
    trace!(type_name = record.type_name(), %id, "assigned identity");
    assigned.insert(ID_KEY, id);
    assigned
}

/// True for an `id` value that names nothing.
fn is_blank_id(id: &Value) -> bool {
    match id {
        Value::Undefined | Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.iter().all(is_blank_id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{RecordId, SeededIds};

    fn rec(type_name: &str, id: &str) -> Value {
        Record::with_identity(type_name, id).into()
    }

    #[test]
    fn test_identity_of_record() {
        let mut record = Record::with_identity("Person", "p1");
        record.insert("name", "Alice");
        assert_eq!(
            identity_of(&record.into()),
            Identity::One(Reference::new("Person", "p1"))
        );
    }

    #[test]
    fn test_identity_of_array_keeps_positions() {
        let anonymous: Value = serde_json::json!({"type": "Person"}).into();
        let items = Value::Array(vec![rec("A", "1"), anonymous, Value::from(3), rec("B", "2")]);
        assert_eq!(
            identity_of(&items),
            Identity::Many(vec![
                Some(Reference::new("A", "1")),
                None,
                None,
                Some(Reference::new("B", "2")),
            ])
        );
    }

    #[test]
    fn test_identity_requires_type_and_id() {
        assert!(identity_of(&serde_json::json!({"id": "x"}).into()).is_absent());
        assert!(identity_of(&serde_json::json!({"type": null, "id": "x"}).into()).is_absent());
        assert!(identity_of(&serde_json::json!({"type": "T", "id": null}).into()).is_absent());
        assert!(identity_of(&Value::from("T")).is_absent());
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid(&serde_json::json!({"type": "Person"}).into()));
        assert!(!is_valid(&serde_json::json!({"type": null}).into()));
        assert!(!is_valid(&serde_json::json!({"type": ""}).into()));
        assert!(!is_valid(&serde_json::json!({"id": "x"}).into()));
        assert!(!is_valid(&serde_json::json!([{"type": "Person"}]).into()));
        assert!(!is_valid(&Value::Null));
    }

    #[test]
    fn test_is_same_identity() {
        let mut named = Record::with_identity("Person", "p1");
        named.insert("name", "Alice");
        assert!(is_same_identity(&rec("Person", "p1"), &named.into()));
        assert!(!is_same_identity(&rec("Person", "p1"), &rec("Person", "p2")));
        assert!(!is_same_identity(&rec("Person", "p1"), &rec("Thing", "p1")));
        assert!(!is_same_identity(&rec("Person", "p1"), &Value::Null));
        assert!(!is_same_identity(&Value::Undefined, &Value::Undefined));
    }

    #[test]
    fn test_is_same_identity_arrays() {
        let a = rec("A", "1");
        let b = rec("B", "2");
        let ab = Value::Array(vec![a.clone(), b.clone()]);
        let ba = Value::Array(vec![b.clone(), a.clone()]);
        assert!(is_same_identity(&ab, &ab.clone()));
        assert!(!is_same_identity(&ab, &ba));
        assert!(!is_same_identity(&ab, &Value::Array(vec![a.clone()])));
        // Array of one is its element, in both directions
        assert!(is_same_identity(&Value::Array(vec![a.clone()]), &a));
        assert!(is_same_identity(&a, &Value::Array(vec![a.clone()])));
    }

    #[test]
    fn test_multi_id_identity() {
        let x: Value = serde_json::json!({"type": "T", "id": ["a", "b"]}).into();
        let y: Value = serde_json::json!({"type": "T", "id": ["a", "b"], "extra": 1}).into();
        let single: Value = serde_json::json!({"type": "T", "id": ["a"]}).into();
        assert!(is_same_identity(&x, &y));
        assert!(is_same_identity(&single, &rec("T", "a")));
        assert_eq!(
            reference_of(&x).map(|r| r.id),
            Some(RecordId::Multi(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_assign_identity() {
        let mut ids = SeededIds::new("test");
        let anonymous: Value = serde_json::json!({"type": "Note", "text": "hi"}).into();
        let assigned = assign_identity(&anonymous, &mut ids).unwrap();
        assert!(reference_of(&assigned.clone().into()).is_some());
        assert_eq!(assigned.value("text"), &Value::from("hi"));
        // Input untouched
        assert!(anonymous.as_object().unwrap().id().is_none());

        assert_eq!(
            assign_identity(&Value::from(5), &mut ids),
            Err(IdentityError::NotAnObject { kind: "number" })
        );
        assert!(matches!(
            assign_identity(&rec("Note", "n1"), &mut ids),
            Err(IdentityError::AlreadyIdentified { .. })
        ));
    }

    #[test]
    fn test_assign_identity_blank_ids_count_as_anonymous() {
        let mut ids = SeededIds::new("test");
        for blank in [json!(""), json!([]), json!([""]), json!(null)] {
            let record: Value = json!({"type": "Note", "id": blank}).into();
            let assigned = assign_identity(&record, &mut ids).unwrap();
            assert!(reference_of(&assigned.into()).is_some(), "{blank}");
        }
    }

    #[test]
    fn test_assign_identity_rejects_malformed_ids() {
        let mut ids = SeededIds::new("test");
        for malformed in [json!(5), json!(["a", 5]), json!({"x": 1}), json!(["a", ""])] {
            let record: Value = json!({"type": "Note", "id": malformed}).into();
            assert!(
                matches!(assign_identity(&record, &mut ids), Err(IdentityError::MalformedId { .. })),
                "{malformed}"
            );
        }
    }
}
