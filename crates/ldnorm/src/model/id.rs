//! Record identifiers, references, and fresh-id generation.
//!
//! A record's id is a string, or a sequence of strings for a multi-id
//! record. Fresh ids are RFC 4122 version 4 UUID strings produced by an
//! [`IdGenerator`] the caller passes in.

use std::fmt;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::model::{ID_KEY, Record, TYPE_KEY, Value};

/// The `id` of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    Single(String),
    Multi(Vec<String>),
}

impl RecordId {
    /// Reads an id from a property value.
    ///
    /// Accepts a non-empty string, or a non-empty sequence of non-empty
    /// strings. A one-element sequence is the same id as its bare element.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(RecordId::Single(s.clone())),
            Value::Array(items) => {
                let ids = items
                    .iter()
                    .map(|item| item.as_str().filter(|s| !s.is_empty()).map(str::to_string))
                    .collect::<Option<Vec<_>>>()?;
                match ids.len() {
                    0 => None,
                    1 => ids.into_iter().next().map(RecordId::Single),
                    _ => Some(RecordId::Multi(ids)),
                }
            }
            _ => None,
        }
    }

    /// Converts back to a property value.
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Single(s) => Value::String(s.clone()),
            RecordId::Multi(ids) => Value::Array(ids.iter().cloned().map(Value::String).collect()),
        }
    }
}

impl fmt::Display for RecordId {
    /// Multi-ids are joined with `,`, the string form used for ordering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Single(s) => f.write_str(s),
            RecordId::Multi(ids) => f.write_str(&ids.join(",")),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Single(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Single(s)
    }
}

/// A `{type, id}` pointer to a record held elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub type_name: String,
    pub id: RecordId,
}

impl Reference {
    pub fn new(type_name: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    /// Extracts the reference of a record with a non-empty `type` and a
    /// well-formed `id`.
    pub fn from_record(record: &Record) -> Option<Self> {
        let type_name = record.type_name().filter(|t| !t.is_empty())?;
        let id = RecordId::from_value(record.id()?)?;
        Some(Self {
            type_name: type_name.to_string(),
            id,
        })
    }

    /// The reference as a two-key record.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(TYPE_KEY, self.type_name.as_str());
        record.insert(ID_KEY, self.id.to_value());
        record
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_record())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_name, self.id)
    }
}

/// Source of fresh record ids.
pub trait IdGenerator {
    /// Returns an id not handed out before by this generator.
    fn next_id(&mut self) -> String;
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}

/// Random version 4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic version 4 formatted UUIDs.
///
/// The n-th id is `SHA-256(seed || n)[0:16]` with the version and variant
/// bits forced, so the same seed always yields the same sequence.
#[derive(Debug, Clone)]
pub struct SeededIds {
    seed: Vec<u8>,
    counter: u64,
}

impl SeededIds {
    pub fn new(seed: impl AsRef<[u8]>) -> Self {
        Self {
            seed: seed.as_ref().to_vec(),
            counter: 0,
        }
    }
}

impl IdGenerator for SeededIds {
    fn next_id(&mut self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.seed);
        hasher.update(self.counter.to_be_bytes());
        let hash = hasher.finalize();
        self.counter += 1;

        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash[..16]);
        // Version 4 (high nibble of byte 6)
        bytes[6] = (bytes[6] & 0x0F) | 0x40;
        // RFC 4122 variant (high bits 10 of byte 8)
        bytes[8] = (bytes[8] & 0x3F) | 0x80;

        Uuid::from_bytes(bytes).to_string()
    }
}

/// Returns true if `s` is a hyphenated RFC 4122 version 4 UUID.
pub fn is_uuid_v4(s: &str) -> bool {
    if s.len() != 36 {
        return false;
    }
    match Uuid::parse_str(s) {
        Ok(uuid) => uuid.get_version_num() == 4 && uuid.get_variant() == uuid::Variant::RFC4122,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ids_are_v4() {
        let mut ids = RandomIds;
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(is_uuid_v4(&a), "{a}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_seeded_ids_deterministic() {
        let mut g1 = SeededIds::new("seed");
        let mut g2 = SeededIds::new("seed");
        let first = g1.next_id();
        assert_eq!(first, g2.next_id());
        assert_ne!(first, g1.next_id());
        assert!(is_uuid_v4(&first));

        let variant = first.as_bytes()[19];
        assert!(matches!(variant, b'8' | b'9' | b'a' | b'b'));
        assert_eq!(first.as_bytes()[14], b'4');
    }

    #[test]
    fn test_record_id_from_value() {
        assert_eq!(RecordId::from_value(&"a".into()), Some(RecordId::from("a")));
        assert_eq!(RecordId::from_value(&vec!["a"].into()), Some(RecordId::from("a")));
        assert_eq!(
            RecordId::from_value(&vec!["a", "b"].into()),
            Some(RecordId::Multi(vec!["a".into(), "b".into()]))
        );
        assert_eq!(RecordId::from_value(&"".into()), None);
        assert_eq!(RecordId::from_value(&Value::Null), None);
        assert_eq!(RecordId::from_value(&Value::Array(vec![])), None);
        assert_eq!(RecordId::from_value(&Value::Array(vec![Value::from(1)])), None);
    }

    #[test]
    fn test_reference_display() {
        let multi = Reference::new("Person", RecordId::Multi(vec!["a".into(), "b".into()]));
        assert_eq!(multi.to_string(), "Person/a,b");
    }
}
