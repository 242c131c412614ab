//! ldnorm: normalization of JSON-LD flavored records.
//!
//! Records are plain key/value objects identified by a `(type, id)` pair.
//! This crate converts between a nested representation (records embedding
//! records) and a flat one (independent records linked by `{type, id}`
//! references), and merges, cleans and compares records under a single
//! identity and multi-valued property model.
//!
//! # Quick Start
//!
//! ```rust
//! use ldnorm::{Flattener, SeededIds, Value, merge, unflatten, UnflattenOptions};
//! use serde_json::json;
//!
//! let nested = Value::from(json!({
//!     "type": "Person",
//!     "id": "p1",
//!     "name": "Alice",
//!     "knows": {"type": "Person", "id": "p2", "name": "Bob"}
//! }));
//!
//! // Nested -> flat
//! let store = Flattener::with_generator(SeededIds::new("docs")).flatten_to_store(&nested);
//! assert_eq!(store.len(), 2);
//!
//! // Flat -> nested
//! let top = Value::from(json!({"type": "Person", "id": "p1"}));
//! let rebuilt = unflatten(&top, &store, UnflattenOptions::new()).unwrap();
//! assert_eq!(Value::Object(rebuilt), nested);
//!
//! // Two snapshots of the same record merge into their union
//! let a = Value::from(json!({"type": "Person", "id": "p1", "name": "John Doe"}));
//! let b = Value::from(json!({"type": "Person", "id": "p1", "name": "John Smith"}));
//! let merged = merge(&a, &b).unwrap();
//! assert_eq!(merged.value("name"), &Value::from(json!(["John Doe", "John Smith"])));
//! ```
//!
//! # Modules
//!
//! - [`model`]: Values, records, references, id generators, builders
//! - [`identity`]: `(type, id)` extraction and comparison
//! - [`normalize`]: clean, compare, flatten, merge and the flat store
//! - [`sniff`]: classification of raw strings
//! - [`util`]: RFC 3339 date handling
//! - [`error`]: Error types
//!
//! # Failure model
//!
//! Operations never panic on unexpected shapes. A declined operation (for
//! example merging records with different identities) returns `None`; the
//! only `Result`-returning operations are explicit identity assignment and
//! date parsing.

pub mod error;
pub mod identity;
pub mod model;
pub mod normalize;
pub mod sniff;
pub mod util;

// Re-export commonly used types at crate root
pub use error::{DateTimeParseError, IdentityError};
pub use identity::{Identity, assign_identity, identity_of, is_same_identity, is_valid};
pub use model::{
    DateTime, ID_KEY, IdGenerator, RandomIds, Record, RecordBuilder, RecordId, Reference, SeededIds,
    TYPE_KEY, Value, is_uuid_v4,
};
pub use normalize::{
    FlatStore, FlattenOptions, Flattener, UnflattenOptions, add, children, clean, compare, delete, eq,
    flatten, is_same, lt, merge, merge_stores, resolve, set_id, set_type, sort, to_canonical,
    to_sequence, unflatten,
};
pub use sniff::{Classified, Kind, classify};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
