//! Utility modules.

pub mod datetime;

pub use datetime::{format_datetime_rfc3339, parse_date_rfc3339, parse_datetime_rfc3339};
