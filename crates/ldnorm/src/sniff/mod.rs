//! Value-type sniffing for raw strings.
//!
//! [`classify`] looks at a string as it might arrive from a form field or a
//! CSV cell and decides what it most likely holds. It is independent of the
//! normalization engine: nothing in [`crate::normalize`] calls it.

use serde_json::Number;

use crate::model::{DateTime, Value};
use crate::util::datetime::{parse_date_rfc3339, parse_datetime_rfc3339};

/// What a raw string was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Number,
    Date,
    Email,
    Url,
    Json,
    String,
}

/// A classified string together with its parsed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub kind: Kind,
    pub value: Value,
}

/// URL schemes recognized by [`classify`].
const URL_SCHEMES: &[&str] = &["http://", "https://", "ftp://", "ftps://", "ws://", "wss://"];

/// Classifies a raw string.
///
/// Checks run in order, first match wins: number, date (RFC 3339 datetime or
/// calendar date), email, URL, JSON object/array, and finally plain string.
/// Surrounding whitespace is ignored for detection; a plain string keeps it.
pub fn classify(raw: &str) -> Classified {
    let s = raw.trim();

    if let Some(number) = parse_number(s) {
        return Classified {
            kind: Kind::Number,
            value: Value::Number(number),
        };
    }
    if let Some(date) = parse_date(s) {
        return Classified {
            kind: Kind::Date,
            value: Value::Date(date),
        };
    }
    if is_email(s) {
        return Classified {
            kind: Kind::Email,
            value: Value::from(s),
        };
    }
    if is_url(s) {
        return Classified {
            kind: Kind::Url,
            value: Value::from(s),
        };
    }
    if s.starts_with('{') || s.starts_with('[') {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(s) {
            return Classified {
                kind: Kind::Json,
                value: Value::from(json),
            };
        }
    }

    Classified {
        kind: Kind::String,
        value: Value::from(raw),
    }
}

/// JSON number syntax only: no leading `+`, no `NaN`/`Infinity`, no hex.
fn parse_number(s: &str) -> Option<Number> {
    let first = s.as_bytes().first()?;
    if !(first.is_ascii_digit() || *first == b'-') {
        return None;
    }
    serde_json::from_str::<Number>(s).ok()
}

fn parse_date(s: &str) -> Option<DateTime> {
    let (epoch_us, offset_min) = match s.len() {
        10 | 11 | 16 => parse_date_rfc3339(s).ok()?,
        _ => parse_datetime_rfc3339(s).ok()?,
    };
    Some(DateTime {
        epoch_us,
        offset_min,
    })
}

fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

fn is_url(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let lower = s.to_ascii_lowercase();
    URL_SCHEMES.iter().any(|scheme| {
        lower
            .strip_prefix(scheme)
            .and_then(|rest| rest.split(['/', '?', '#']).next())
            .is_some_and(|host| !host.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(s: &str) -> Kind {
        classify(s).kind
    }

    #[test]
    fn test_classify_numbers() {
        assert_eq!(kind("42"), Kind::Number);
        assert_eq!(kind("-3.5e2"), Kind::Number);
        assert_eq!(classify(" 7 ").value, Value::from(7));
        assert_eq!(kind("+1"), Kind::String);
        assert_eq!(kind("NaN"), Kind::String);
        assert_eq!(kind("12abc"), Kind::String);
    }

    #[test]
    fn test_classify_dates() {
        let c = classify("2024-03-15T14:30:00Z");
        assert_eq!(c.kind, Kind::Date);
        assert_eq!(c.value, Value::Date(DateTime::utc(1_710_513_000_000_000)));
        assert_eq!(kind("2024-03-15"), Kind::Date);
        assert_eq!(kind("2024-03-15+05:30"), Kind::Date);
        assert_eq!(kind("2024-02-30"), Kind::String);
        assert_eq!(kind("2024-03-15T-1:00:00Z"), Kind::String);
        assert_eq!(kind("2024-03-15+-1:00"), Kind::String);
    }

    #[test]
    fn test_classify_email_and_url() {
        assert_eq!(kind("alice@example.com"), Kind::Email);
        assert_eq!(kind("alice@localhost"), Kind::String);
        assert_eq!(kind("a@b@c.com"), Kind::String);
        assert_eq!(kind("https://example.com/path?q=1"), Kind::Url);
        assert_eq!(kind("HTTP://EXAMPLE.COM"), Kind::Url);
        assert_eq!(kind("https://"), Kind::String);
        assert_eq!(kind("example.com"), Kind::String);
    }

    #[test]
    fn test_classify_json() {
        let c = classify(r#"{"type": "Person", "id": "p1"}"#);
        assert_eq!(c.kind, Kind::Json);
        assert_eq!(c.value.as_object().and_then(|r| r.type_name()), Some("Person"));
        assert_eq!(kind("[1, 2]"), Kind::Json);
        assert_eq!(kind("{not json"), Kind::String);
    }

    #[test]
    fn test_plain_string_is_untrimmed() {
        let c = classify("  hello world ");
        assert_eq!(c.kind, Kind::String);
        assert_eq!(c.value, Value::from("  hello world "));
    }
}
