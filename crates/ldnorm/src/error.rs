//! Error types for identity assignment and date parsing.
//!
//! Most normalization operations never fail: a declined operation returns
//! `None` or [`Value::Undefined`](crate::Value::Undefined). The errors here
//! cover the few places where the caller explicitly asked for something the
//! input cannot provide.

use thiserror::Error;

/// Error returned when assigning an identity to a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The value is not record-shaped at all (a primitive, array, null, ...).
    #[error("cannot assign an identity to a {kind} value")]
    NotAnObject { kind: &'static str },

    /// The record already carries an `id`.
    #[error("record of type {type_name:?} already has id {id:?}")]
    AlreadyIdentified { type_name: Option<String>, id: String },

    /// The record's `id` is neither blank nor a usable string id.
    #[error("record of type {type_name:?} has malformed id {id}")]
    MalformedId { type_name: Option<String>, id: String },
}

/// Error during RFC 3339 date/time parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeParseError {
    #[error("invalid RFC 3339 {what}: {input}")]
    Malformed { what: &'static str, input: String },

    #[error("invalid {field} in {input}")]
    FieldOutOfRange { field: &'static str, input: String },

    #[error("invalid timezone offset: {offset}")]
    InvalidOffset { offset: String },
}
