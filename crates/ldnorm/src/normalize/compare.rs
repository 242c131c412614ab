//! Equality and ordering over values.
//!
//! Identity wins: two records that both carry a `(type, id)` are equal when
//! their identities are, whatever else they hold. Everything else compares
//! structurally.

use std::cmp::Ordering;

use serde_json::Number;

use crate::identity::{reference_of, unwrap_single};
use crate::model::{Reference, Value};

/// Identity-aware deep equality.
///
/// Objects compare by key set and values regardless of key order, arrays in
/// order, numbers by numeric value, dates by instant. `Null` and `Undefined`
/// each equal themselves but not each other.
pub fn eq(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (reference_of(a), reference_of(b)) {
        return x == y;
    }

    match (a, b) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Ordering::Equal,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x.epoch_us == y.epoch_us,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| eq(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len() && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| eq(v, w)))
        }
        _ => false,
    }
}

/// Identity-oriented equality.
///
/// One-element arrays stand for their element. Two arrays are compared as
/// multisets: same cardinality, each element matched once, any order.
pub fn is_same(a: &Value, b: &Value) -> bool {
    match (unwrap_single(a), unwrap_single(b)) {
        (Value::Array(xs), Value::Array(ys)) => same_members(xs, ys),
        (Value::Array(_), _) | (_, Value::Array(_)) => false,
        (x, y) => eq(x, y),
    }
}

fn same_members(xs: &[Value], ys: &[Value]) -> bool {
    if xs.len() != ys.len() {
        return false;
    }
    let mut used = vec![false; ys.len()];
    for x in xs {
        let found = (0..ys.len()).find(|&i| !used[i] && is_same(x, &ys[i]));
        match found {
            Some(i) => used[i] = true,
            None => return false,
        }
    }
    true
}

/// Total order used by [`lt`] and [`sort`].
///
/// Values are ranked by kind first:
/// `Null`/`Undefined` < booleans < numbers < dates < strings < arrays <
/// identified records < other objects. Within a kind:
///
/// - `Null` and `Undefined` tie;
/// - numbers compare numerically, integers against floats exactly;
/// - dates compare by instant;
/// - strings compare lexicographically;
/// - arrays compare element by element, then by length;
/// - identified records compare by `type`, then `id` (multi-ids joined
///   with `,`);
/// - other objects compare by their JSON text.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (SortKey::of(a), SortKey::of(b)) {
        (SortKey::Bool(x), SortKey::Bool(y)) => x.cmp(&y),
        (SortKey::Number(x), SortKey::Number(y)) => compare_numbers(x, y),
        (SortKey::Date(x), SortKey::Date(y)) => x.cmp(&y),
        (SortKey::String(x), SortKey::String(y)) => x.cmp(y),
        (SortKey::Array(xs), SortKey::Array(ys)) => xs
            .iter()
            .zip(ys)
            .map(|(x, y)| compare(x, y))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| xs.len().cmp(&ys.len())),
        (SortKey::Reference(x), SortKey::Reference(y)) => x
            .type_name
            .cmp(&y.type_name)
            .then_with(|| x.id.to_string().cmp(&y.id.to_string())),
        (SortKey::Object(x), SortKey::Object(y)) => x.cmp(&y),
        (x, y) => x.rank().cmp(&y.rank()),
    }
}

enum SortKey<'a> {
    Nullish,
    Bool(bool),
    Number(&'a Number),
    Date(i64),
    String(&'a str),
    Array(&'a [Value]),
    Reference(Reference),
    Object(String),
}

impl<'a> SortKey<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::Undefined | Value::Null => SortKey::Nullish,
            Value::Bool(b) => SortKey::Bool(*b),
            Value::Number(n) => SortKey::Number(n),
            Value::Date(d) => SortKey::Date(d.epoch_us),
            Value::String(s) => SortKey::String(s),
            Value::Array(items) => SortKey::Array(items),
            Value::Object(record) => match record.reference() {
                Some(reference) => SortKey::Reference(reference),
                None => SortKey::Object(record.to_json().to_string()),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Nullish => 0,
            SortKey::Bool(_) => 1,
            SortKey::Number(_) => 2,
            SortKey::Date(_) => 3,
            SortKey::String(_) => 4,
            SortKey::Array(_) => 5,
            SortKey::Reference(_) => 6,
            SortKey::Object(_) => 7,
        }
    }
}

/// Returns true if `a` sorts strictly before `b`.
pub fn lt(a: &Value, b: &Value) -> bool {
    compare(a, b) == Ordering::Less
}

/// Stable sort by [`compare`]. Ties keep their input order in both
/// directions.
pub fn sort(values: &[Value], reverse: bool) -> Vec<Value> {
    let mut sorted = values.to_vec();
    if reverse {
        sorted.sort_by(|a, b| compare(b, a));
    } else {
        sorted.sort_by(compare);
    }
    sorted
}

fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    match (as_integer(x), as_integer(y)) {
        (Some(i), Some(j)) => i.cmp(&j),
        (Some(i), None) => compare_integer_float(i, y.as_f64().unwrap_or(f64::NAN)),
        (None, Some(j)) => compare_integer_float(j, x.as_f64().unwrap_or(f64::NAN)).reverse(),
        (None, None) => {
            let fx = x.as_f64().unwrap_or(f64::NAN);
            let fy = y.as_f64().unwrap_or(f64::NAN);
            // -0.0 == 0.0, matching integer zero
            fx.partial_cmp(&fy).unwrap_or(Ordering::Equal)
        }
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from))
}

/// Exact comparison; `i` fits in 65 bits so the bounds below are exact.
fn compare_integer_float(i: i128, f: f64) -> Ordering {
    const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;
    if f >= TWO_POW_64 {
        return Ordering::Less;
    }
    if f < -TWO_POW_64 {
        return Ordering::Greater;
    }
    let whole = f.trunc() as i128;
    i.cmp(&whole)
        .then_with(|| 0.0f64.partial_cmp(&f.fract()).unwrap_or(Ordering::Equal))
}
