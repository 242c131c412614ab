//! The normalization engine.
//!
//! - [`container`]: single/multi-valued property canonicalization
//! - [`clean`]: absent-value pruning
//! - [`compare`]: identity-aware equality and ordering
//! - [`flatten`]: nested ⇄ flat conversion
//! - [`merge`]: union merge of same-identity records
//! - [`store`]: the flat store

pub mod clean;
pub mod compare;
pub mod container;
pub mod flatten;
pub mod merge;
pub mod store;

pub use clean::{clean, clean_record};
pub use compare::{compare, eq, is_same, lt, sort};
pub use container::{add, delete, set_id, set_type, to_canonical, to_sequence};
pub use flatten::{FlattenOptions, Flattener, UnflattenOptions, children, flatten, resolve, unflatten};
pub use merge::{merge, merge_records, merge_stores};
pub use store::FlatStore;
