//! Union merge of records that share an identity.

use tracing::debug;

use crate::identity::is_valid_record;
use crate::model::{Record, Value, is_identity_key};
use crate::normalize::clean::clean_record;
use crate::normalize::compare::eq;
use crate::normalize::container::{store_canonical, to_sequence};
use crate::normalize::store::FlatStore;

/// Merges two records with the same `(type, id)`.
///
/// Returns `None` unless both are valid records with identical identities.
/// `type` and `id` come from `a`. Every other key of either record is kept:
///
/// - only in one record: copied as is;
/// - in both with equal values: `a`'s value;
/// - in both with different values: `a`'s values followed by `b`'s.
///   Duplicates are not removed.
///
/// The result is [`clean`](crate::normalize::clean)ed.
pub fn merge(a: &Value, b: &Value) -> Option<Record> {
    match (a.as_object(), b.as_object()) {
        (Some(ra), Some(rb)) => merge_records(ra, rb),
        _ => {
            debug!(a = a.kind(), b = b.kind(), "merge declined: not records");
            None
        }
    }
}

/// Record form of [`merge`].
pub fn merge_records(a: &Record, b: &Record) -> Option<Record> {
    if !is_valid_record(a) || !is_valid_record(b) {
        debug!("merge declined: record has no valid type");
        return None;
    }
    match (a.reference(), b.reference()) {
        (Some(ra), Some(rb)) if ra == rb => {}
        (ra, rb) => {
            debug!(
                a = ra.map(|r| r.to_string()),
                b = rb.map(|r| r.to_string()),
                "merge declined: identities differ"
            );
            return None;
        }
    }

    let mut merged = Record::new();
    for (key, value) in a {
        if is_identity_key(key) {
            merged.insert(key.as_str(), value.clone());
            continue;
        }
        match b.get(key) {
            Some(other) if !eq(value, other) => {
                let mut values = to_sequence(value);
                values.extend(to_sequence(other));
                store_canonical(&mut merged, key, values);
            }
            _ => {
                merged.insert(key.as_str(), value.clone());
            }
        }
    }
    for (key, value) in b {
        if is_identity_key(key) || a.contains_key(key) {
            continue;
        }
        merged.insert(key.as_str(), value.clone());
    }

    Some(clean_record(&merged))
}

/// Reconciles two flat stores.
///
/// Records of `b` whose identity is already in `a` are merged into it (with
/// `a` first); the others are appended in `b`'s order.
pub fn merge_stores(a: &FlatStore, b: &FlatStore) -> FlatStore {
    let mut merged = a.clone();
    for record in b {
        merged.upsert(record.clone());
    }
    merged
}
