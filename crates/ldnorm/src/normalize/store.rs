//! Flat stores: ordered, identity-indexed collections of records.

use rustc_hash::FxHashMap;

use crate::model::{Record, Reference, Value};
use crate::normalize::container::to_canonical;
use crate::normalize::merge::merge_records;

/// An ordered sequence of records with no two sharing an identity.
///
/// Records without a complete identity (for example an anonymous top-level
/// record) are kept in order but are not indexed, so they never collide.
#[derive(Debug, Clone, Default)]
pub struct FlatStore {
    records: Vec<Record>,
    index: FxHashMap<Reference, usize>,
}

impl FlatStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a store from its canonical value form: an array of records, a
    /// single record, or `Undefined`. Non-object elements are skipped.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(record) => std::iter::once(record.clone()).collect(),
            Value::Array(items) => items.iter().filter_map(Value::as_object).cloned().collect(),
            _ => Self::new(),
        }
    }

    /// Adds a record, merging it into the existing entry when one with the
    /// same identity is already present. Returns the record's position.
    pub fn upsert(&mut self, record: Record) -> usize {
        let Some(reference) = record.reference() else {
            self.records.push(record);
            return self.records.len() - 1;
        };

        if let Some(&pos) = self.index.get(&reference) {
            if let Some(merged) = merge_records(&self.records[pos], &record) {
                self.records[pos] = merged;
            }
            return pos;
        }

        self.records.push(record);
        let pos = self.records.len() - 1;
        self.index.insert(reference, pos);
        pos
    }

    /// Looks up the record a reference points to.
    pub fn resolve(&self, reference: &Reference) -> Option<&Record> {
        self.index.get(reference).map(|&pos| &self.records[pos])
    }

    pub fn get(&self, pos: usize) -> Option<&Record> {
        self.records.get(pos)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Canonical value form: `Undefined` when empty, the bare record when
    /// there is one, an array otherwise.
    pub fn into_value(self) -> Value {
        to_canonical(self.records.into_iter().map(Value::Object).collect())
    }
}

impl FromIterator<Record> for FlatStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.upsert(record);
        }
        store
    }
}

impl IntoIterator for FlatStore {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a FlatStore {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn record(json: serde_json::Value) -> Record {
        Value::from(json).as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_upsert_merges_same_identity() {
        let mut store = FlatStore::new();
        let first = store.upsert(record(json!({"type": "Person", "id": "p1", "name": "A"})));
        store.upsert(record(json!({"type": "Person", "id": "p2"})));
        let again = store.upsert(record(json!({"type": "Person", "id": "p1", "age": 3})));

        assert_eq!(first, again);
        assert_eq!(store.len(), 2);
        let p1 = store.resolve(&Reference::new("Person", "p1")).unwrap();
        assert_eq!(p1, &record(json!({"type": "Person", "id": "p1", "name": "A", "age": 3})));
    }

    #[test]
    fn test_unidentified_records_are_appended() {
        let mut store = FlatStore::new();
        store.upsert(record(json!({"type": "Note"})));
        store.upsert(record(json!({"type": "Note"})));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_into_value_shapes() {
        assert_eq!(FlatStore::new().into_value(), Value::Undefined);

        let one: FlatStore = [record(json!({"type": "T", "id": "1"}))].into_iter().collect();
        assert!(matches!(one.into_value(), Value::Object(_)));

        let two = FlatStore::from_value(&json!([{"type": "T", "id": "1"}, 5, {"type": "T", "id": "2"}]).into());
        assert_eq!(two.len(), 2);
        assert!(matches!(two.into_value(), Value::Array(items) if items.len() == 2));
    }

    #[test]
    fn test_resolve_missing() {
        let store = FlatStore::from_value(&json!({"type": "T", "id": "1"}).into());
        assert!(store.resolve(&Reference::new("T", "2")).is_none());
        assert!(store.resolve(&Reference::new("U", "1")).is_none());
    }
}
