//! Records: insertion-ordered property maps identified by `type` and `id`.

use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter};

use crate::model::{Reference, Value};

/// Reserved key holding a record's type.
pub const TYPE_KEY: &str = "type";

/// Reserved key holding a record's id (a string or a sequence of strings).
pub const ID_KEY: &str = "id";

/// Returns true for the two keys that make up a record's identity.
pub fn is_identity_key(key: &str) -> bool {
    key == TYPE_KEY || key == ID_KEY
}

static UNDEFINED: Value = Value::Undefined;

/// A mapping from property names to values.
///
/// Keys keep insertion order, which is the order they serialize in.
/// Equality ignores key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    props: IndexMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record holding only `type` and `id`.
    pub fn with_identity(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.insert(TYPE_KEY, type_name.into());
        record.insert(ID_KEY, id.into());
        record
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Returns the value under `key`, or [`Value::Undefined`] when missing.
    pub fn value(&self, key: &str) -> &Value {
        self.props.get(key).unwrap_or(&UNDEFINED)
    }

    /// Sets `key`, keeping its position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.props.insert(key.into(), value.into())
    }

    /// Removes `key`, preserving the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.props.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.props.keys().map(String::as_str)
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.props.iter()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// The `type` key if it holds a string.
    pub fn type_name(&self) -> Option<&str> {
        self.props.get(TYPE_KEY).and_then(Value::as_str)
    }

    /// The raw `id` value, if present.
    pub fn id(&self) -> Option<&Value> {
        self.props.get(ID_KEY)
    }

    /// The reference view of this record, if it has a complete identity.
    pub fn reference(&self) -> Option<Reference> {
        Reference::from_record(self)
    }

    /// Converts to a plain JSON object, dropping `Undefined` members.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.props
                .iter()
                .filter(|(_, v)| !v.is_undefined())
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            props: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.props.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.props.iter()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_keeps_order() {
        let mut record = Record::with_identity("Person", "p1");
        record.insert("a", 1);
        record.insert("b", 2);
        record.remove("a");
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["type", "id", "b"]);
    }

    #[test]
    fn test_missing_value_is_undefined() {
        let record = Record::new();
        assert!(record.value("nope").is_undefined());
        assert!(record.get("nope").is_none());
    }

    #[test]
    fn test_equality_ignores_key_order() {
        let mut a = Record::new();
        a.insert("x", 1);
        a.insert("y", 2);
        let mut b = Record::new();
        b.insert("y", 2);
        b.insert("x", 1);
        assert_eq!(a, b);
    }
}
