//! Data model types.
//!
//! - Values (JSON plus absence and dates)
//! - Records (ordered property maps with a reserved identity)
//! - Identifiers, references and id generators
//! - Builders (ergonomic construction)

pub mod builder;
pub mod id;
pub mod record;
pub mod value;

pub use builder::RecordBuilder;
pub use id::{IdGenerator, RandomIds, RecordId, Reference, SeededIds, is_uuid_v4};
pub use record::{ID_KEY, Record, TYPE_KEY, is_identity_key};
pub use value::{DateTime, Value};
