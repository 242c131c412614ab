//! Builder API for ergonomic record construction.
//!
//! # Example
//!
//! ```rust
//! use ldnorm::RecordBuilder;
//!
//! let alice = RecordBuilder::new("Person")
//!     .id("p1")
//!     .prop("name", "Alice")
//!     .push("email", "alice@example.com")
//!     .push("email", "alice@work.example")
//!     .embed("worksFor", "Organization", |org| org
//!         .id("acme")
//!         .prop("name", "Acme")
//!     )
//!     .reference("knows", "Person", "p2")
//!     .build();
//!
//! assert_eq!(alice.type_name(), Some("Person"));
//! ```

use crate::model::{ID_KEY, Record, RecordId, Reference, TYPE_KEY, Value};
use crate::normalize::container::{into_sequence, store_canonical, to_sequence};

/// Builder for a [`Record`].
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Starts a record of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        let mut record = Record::new();
        record.insert(TYPE_KEY, type_name.into());
        Self { record }
    }

    /// Starts a plain object with no `type`.
    pub fn untyped() -> Self {
        Self::default()
    }

    /// Sets the record's id.
    pub fn id(mut self, id: impl Into<RecordId>) -> Self {
        self.record.insert(ID_KEY, id.into().to_value());
        self
    }

    /// Sets a multi-id.
    pub fn ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        match ids.len() {
            0 => self,
            1 => self.id(ids.into_iter().next().unwrap_or_default()),
            _ => self.id(RecordId::Multi(ids)),
        }
    }

    /// Sets a property, replacing any previous value.
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.insert(key, value);
        self
    }

    /// Appends to a multi-valued property.
    pub fn push(mut self, key: &str, value: impl Into<Value>) -> Self {
        let mut values = to_sequence(self.record.value(key));
        values.extend(into_sequence(value.into()));
        store_canonical(&mut self.record, key, values);
        self
    }

    // =========================================================================
    // Nested records
    // =========================================================================

    /// Appends an embedded record built by `f`.
    pub fn embed<F>(self, key: &str, type_name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(RecordBuilder) -> RecordBuilder,
    {
        let nested = f(RecordBuilder::new(type_name)).build();
        self.push(key, nested)
    }

    /// Appends a `{type, id}` reference.
    pub fn reference(self, key: &str, type_name: impl Into<String>, id: impl Into<RecordId>) -> Self {
        self.push(key, Reference::new(type_name, id).to_value())
    }

    /// Finishes the record.
    pub fn build(self) -> Record {
        self.record
    }

    /// Finishes the record as a [`Value`].
    pub fn into_value(self) -> Value {
        Value::Object(self.record)
    }
}
