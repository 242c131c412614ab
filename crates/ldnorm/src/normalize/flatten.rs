//! Nested ⇄ flat conversion.
//!
//! Flattening walks a record tree depth-first and lifts every embedded
//! record (an object with a valid `type`) into a [`FlatStore`], leaving a
//! `{type, id}` reference in its place. Unflattening goes the other way,
//! following references through a store.
//!
//! # Ordering
//!
//! A record's embedded records are emitted before the record itself. For an
//! array input, each element is processed in turn, so its extracted records
//! stay grouped with it.
//!
//! # Cycles
//!
//! A nested [`Value`] is an owned tree and cannot embed itself. A flat store
//! can, through references (`a -> b -> a`). [`unflatten`] stops at a
//! reference whose identity is already being expanded on the current path
//! and leaves it as a reference.

use std::borrow::Cow;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::identity::{assign_record_identity, is_valid_record, reference_of, with_fresh_id};
use crate::model::{IdGenerator, RandomIds, Record, Reference, Value, is_identity_key};
use crate::normalize::store::FlatStore;

/// Options for [`Flattener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlattenOptions {
    /// Give embedded records without a usable `id` a fresh one so they can
    /// be extracted. A blank `id` (`""`, `[]`) counts as missing; a malformed
    /// one (`5`, `["a", 7]`) is replaced.
    ///
    /// When disabled, such records stay inline (their own identified
    /// descendants are still extracted).
    pub assign_ids: bool,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self { assign_ids: true }
    }
}

impl FlattenOptions {
    /// Creates default options (ids are assigned).
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that never assign ids.
    pub fn keep_anonymous() -> Self {
        Self { assign_ids: false }
    }
}

/// Options for [`unflatten`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnflattenOptions {
    /// Maximum number of reference hops to expand below the root. `None`
    /// expands everything reachable (cycles are still cut).
    pub max_depth: Option<usize>,
}

impl UnflattenOptions {
    /// Creates default options (unbounded depth).
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands at most `depth` reference hops.
    pub fn max_depth(depth: usize) -> Self {
        Self {
            max_depth: Some(depth),
        }
    }
}

/// Decomposes nested records into a flat store.
///
/// Holds the id generator used for anonymous embedded records.
#[derive(Debug, Clone)]
pub struct Flattener<G = RandomIds> {
    ids: G,
    options: FlattenOptions,
}

impl Flattener<RandomIds> {
    /// Creates a flattener that assigns random v4 UUIDs.
    pub fn new() -> Self {
        Self::with_generator(RandomIds)
    }
}

impl Default for Flattener<RandomIds> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> Flattener<G> {
    /// Creates a flattener drawing fresh ids from `ids`.
    pub fn with_generator(ids: G) -> Self {
        Self {
            ids,
            options: FlattenOptions::default(),
        }
    }

    /// Replaces the options.
    pub fn options(mut self, options: FlattenOptions) -> Self {
        self.options = options;
        self
    }

    /// Flattens `value` to its canonical store value: an array of records,
    /// the bare record when there is exactly one, or `Undefined` when there
    /// are none (including for non-object, non-array input).
    pub fn flatten(&mut self, value: &Value) -> Value {
        self.flatten_to_store(value).into_value()
    }

    /// Flattens `value` into a [`FlatStore`].
    ///
    /// Non-object elements of an array input are skipped. Top-level records
    /// are emitted even when they have no identity of their own.
    pub fn flatten_to_store(&mut self, value: &Value) -> FlatStore {
        let mut store = FlatStore::new();
        match value {
            Value::Object(record) => self.extract_root(record, &mut store),
            Value::Array(items) => {
                for record in items.iter().filter_map(Value::as_object) {
                    self.extract_root(record, &mut store);
                }
            }
            _ => {}
        }
        store
    }

    fn extract_root(&mut self, record: &Record, store: &mut FlatStore) {
        let flat = self.flatten_record(record, store);
        store.upsert(flat);
    }

    /// Flattens the non-identity properties of `record`.
    fn flatten_record(&mut self, record: &Record, store: &mut FlatStore) -> Record {
        record
            .iter()
            .map(|(key, value)| {
                let flat = if is_identity_key(key) {
                    value.clone()
                } else {
                    self.flatten_value(value, store)
                };
                (key.clone(), flat)
            })
            .collect()
    }

    fn flatten_value(&mut self, value: &Value, store: &mut FlatStore) -> Value {
        match value {
            Value::Object(record) if is_valid_record(record) => self.extract_embedded(record, store),
            // Plain nested objects stay inline but may hold records
            Value::Object(record) => Value::Object(self.flatten_record(record, store)),
            Value::Array(items) => Value::Array(items.iter().map(|item| self.flatten_value(item, store)).collect()),
            other => other.clone(),
        }
    }

    /// Moves an embedded record into the store and returns its reference.
    fn extract_embedded(&mut self, record: &Record, store: &mut FlatStore) -> Value {
        let record = match record.reference() {
            Some(_) => Cow::Borrowed(record),
            None if self.options.assign_ids => match assign_record_identity(record, &mut self.ids) {
                Ok(assigned) => Cow::Owned(assigned),
                Err(err) => {
                    debug!(%err, "replacing unusable id");
                    Cow::Owned(with_fresh_id(record, &mut self.ids))
                }
            },
            None => return Value::Object(self.flatten_record(record, store)),
        };

        let flat = self.flatten_record(&record, store);
        match flat.reference() {
            Some(reference) => {
                store.upsert(flat);
                reference.to_value()
            }
            None => Value::Object(flat),
        }
    }
}

/// Flattens `value`, assigning random v4 UUIDs to anonymous embedded records.
///
/// See [`Flattener::flatten`].
pub fn flatten(value: &Value) -> Value {
    Flattener::new().flatten(value)
}

/// Returns the references of every identified record embedded in `value`,
/// directly or transitively, in discovery order and without duplicates.
///
/// The top-level record (or each top-level array element) is not itself
/// included. Anonymous embedded records are skipped since they have no
/// reference yet, but their contents are searched.
pub fn children(value: &Value) -> Vec<Reference> {
    let mut found = Vec::new();
    let mut seen = FxHashSet::default();
    match value {
        Value::Object(record) => collect_children(record, &mut found, &mut seen),
        Value::Array(items) => {
            for record in items.iter().filter_map(Value::as_object) {
                collect_children(record, &mut found, &mut seen);
            }
        }
        _ => {}
    }
    found
}

fn collect_children(record: &Record, found: &mut Vec<Reference>, seen: &mut FxHashSet<Reference>) {
    for (key, value) in record {
        if !is_identity_key(key) {
            collect_value(value, found, seen);
        }
    }
}

fn collect_value(value: &Value, found: &mut Vec<Reference>, seen: &mut FxHashSet<Reference>) {
    match value {
        Value::Object(record) => {
            if let Some(reference) = record.reference() {
                if seen.insert(reference.clone()) {
                    found.push(reference);
                }
            }
            collect_children(record, found, seen);
        }
        Value::Array(items) => {
            for item in items {
                collect_value(item, found, seen);
            }
        }
        _ => {}
    }
}

/// Returns the record `reference` points to, or `None` if `reference` has no
/// identity or the store has no matching record.
pub fn resolve(reference: &Value, store: &FlatStore) -> Option<Record> {
    let reference = reference_of(reference)?;
    store.resolve(&reference).cloned()
}

/// Rebuilds the nested form of the record `reference` points to.
///
/// References inside it are replaced by their resolved records, recursively.
/// References that do not resolve, that would re-enter a record already being
/// expanded, or that lie beyond `options.max_depth` are left as they are.
pub fn unflatten(reference: &Value, store: &FlatStore, options: UnflattenOptions) -> Option<Record> {
    let root = reference_of(reference)?;
    let record = store.resolve(&root)?;
    let mut path = FxHashSet::default();
    path.insert(root);
    Some(expand_record(record, store, &mut path, 0, options))
}

fn expand_record(
    record: &Record,
    store: &FlatStore,
    path: &mut FxHashSet<Reference>,
    depth: usize,
    options: UnflattenOptions,
) -> Record {
    record
        .iter()
        .map(|(key, value)| {
            let expanded = if is_identity_key(key) {
                value.clone()
            } else {
                expand_value(value, store, path, depth, options)
            };
            (key.clone(), expanded)
        })
        .collect()
}

fn expand_value(
    value: &Value,
    store: &FlatStore,
    path: &mut FxHashSet<Reference>,
    depth: usize,
    options: UnflattenOptions,
) -> Value {
    match value {
        Value::Object(record) => {
            let Some(reference) = record.reference() else {
                return Value::Object(expand_record(record, store, path, depth, options));
            };
            if options.max_depth.is_some_and(|max| depth >= max) {
                return value.clone();
            }
            if path.contains(&reference) {
                trace!(%reference, "reference cycle left unexpanded");
                return value.clone();
            }
            match store.resolve(&reference) {
                Some(target) => {
                    path.insert(reference.clone());
                    let expanded = expand_record(target, store, path, depth + 1, options);
                    path.remove(&reference);
                    Value::Object(expanded)
                }
                None => Value::Object(expand_record(record, store, path, depth, options)),
            }
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| expand_value(item, store, path, depth, options))
                .collect(),
        ),
        other => other.clone(),
    }
}
