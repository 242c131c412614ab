//! Property values.
//!
//! A [`Value`] is a JSON value extended with two variants JSON itself cannot
//! express: [`Value::Undefined`] (a property that is explicitly absent) and
//! [`Value::Date`] (an instant, compared and ordered by time rather than by
//! its text).

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use crate::error::DateTimeParseError;
use crate::model::Record;
use crate::util::datetime::{format_datetime_rfc3339, parse_datetime_rfc3339};

/// An instant with the UTC offset it was written with.
///
/// Two dates denote the same instant when their `epoch_us` match, whatever
/// their offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTime {
    /// Microseconds since Unix epoch (1970-01-01T00:00:00Z).
    pub epoch_us: i64,
    /// Signed UTC offset in minutes (e.g., +330 for +05:30).
    pub offset_min: i16,
}

impl DateTime {
    /// Creates a UTC instant.
    pub fn utc(epoch_us: i64) -> Self {
        Self {
            epoch_us,
            offset_min: 0,
        }
    }

    /// Parses an RFC 3339 datetime.
    pub fn parse(s: &str) -> Result<Self, DateTimeParseError> {
        let (epoch_us, offset_min) = parse_datetime_rfc3339(s)?;
        Ok(Self {
            epoch_us,
            offset_min,
        })
    }

    /// Formats this instant as RFC 3339 at its own offset.
    pub fn to_rfc3339(&self) -> String {
        format_datetime_rfc3339(self.epoch_us, self.offset_min)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// A property value.
///
/// Derived `PartialEq` is strict structural equality (object key order is
/// ignored, date offsets are not). Identity-aware equality lives in
/// [`crate::normalize::compare`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Explicitly absent. Removed by [`clean`](crate::normalize::clean).
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Date(DateTime),
    /// An ordered multi-valued property.
    Array(Vec<Value>),
    Object(Record),
}

impl Value {
    /// Returns a short name for the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for `Null` and `Undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn as_object(&self) -> Option<&Record> {
        match self {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Converts to a plain JSON value.
    ///
    /// `Undefined` object members are dropped, `Undefined` elsewhere becomes
    /// `null`, and dates become RFC 3339 strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.to_rfc3339()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(record) => record.to_json(),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<DateTime> for Value {
    fn from(d: DateTime) -> Self {
        Value::Date(d)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    /// `None` is an absent value, not `null`.
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Undefined, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Date(d) => serializer.serialize_str(&d.to_rfc3339()),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(record) => record.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present = self.iter().filter(|(_, v)| !v.is_undefined());
        let mut map = serializer.serialize_map(Some(present.clone().count()))?;
        for (key, value) in present {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::deserialize(deserializer)?;
        Ok(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }
}
