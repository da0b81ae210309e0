// Persistence collaborator interface
//
// The handlers never construct persistence logic themselves; everything they
// need from storage goes through the narrow traits below. A backing engine
// (SQL, document store, in-memory fixture) implements `Store` once per object
// type and owns transactions, locking and field normalization.

use std::collections::{BTreeSet, HashSet};
use std::iter::Peekable;

use serde_json::Value;
use thiserror::Error;

use crate::serialize::Serializable;

/// Errors surfaced by a persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No object exists under the requested identifier.
    #[error("not found")]
    NotFound,

    /// Anything else: lost connections, constraint violations, backend bugs.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// A persistence-owned entity with a canonical plain-mapping form.
///
/// The mapping returned by [`Serializable::as_dict`] holds one key per field
/// plus a `pk` key with the identifier; many-to-many relation fields appear
/// as a list of target primary keys.
pub trait DomainObject: Serializable {
    /// Primary key. `None` until the first save assigns one.
    fn pk(&self) -> Option<String>;

    /// Set one field. Type coercion and normalization happen at save time,
    /// not here.
    fn set_field(&mut self, name: &str, value: Value);

    /// Mutable handle on a named many-to-many relation. An unknown field
    /// name is a wiring mistake, not client input, so it surfaces as a
    /// backend error.
    fn relation(&mut self, field: &str) -> Result<&mut dyn RelationTargets, StoreError>;
}

/// Set-like handle over a relation's target set. Mutation is bulk-only;
/// there is no single-edge granularity.
pub trait RelationTargets {
    fn add(&mut self, targets: Vec<Box<dyn DomainObject>>);
    fn remove(&mut self, targets: Vec<Box<dyn DomainObject>>);
}

// Ready-made handle for implementations that track relation edges as a set
// of target primary keys. Unsaved targets (no pk yet) are skipped.
impl RelationTargets for BTreeSet<String> {
    fn add(&mut self, targets: Vec<Box<dyn DomainObject>>) {
        for target in targets {
            if let Some(pk) = target.pk() {
                self.insert(pk);
            }
        }
    }

    fn remove(&mut self, targets: Vec<Box<dyn DomainObject>>) {
        for target in targets {
            if let Some(pk) = target.pk() {
                BTreeSet::remove(self, &pk);
            }
        }
    }
}

/// Lazily-evaluated result set. Nothing is materialized until iteration,
/// which the serializer (or an emptiness probe) triggers.
pub struct QueryResult {
    iter: Peekable<Box<dyn Iterator<Item = Box<dyn DomainObject>>>>,
}

impl QueryResult {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Box<dyn DomainObject>> + 'static,
    {
        let boxed: Box<dyn Iterator<Item = Box<dyn DomainObject>>> = Box::new(iter);
        Self {
            iter: boxed.peekable(),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    /// Emptiness probe; materializes at most one element.
    pub fn is_empty(&mut self) -> bool {
        self.iter.peek().is_none()
    }
}

impl Iterator for QueryResult {
    type Item = Box<dyn DomainObject>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

impl std::fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("QueryResult")
    }
}

/// Narrow interface onto the persistence engine. One store serves one object
/// type; a relation handler holds a second store for the target type.
/// Filtering and pagination are bound inside the implementation, not exposed
/// here.
pub trait Store {
    /// Fetch by primary key.
    fn fetch(&self, pk: &str) -> Result<Box<dyn DomainObject>, StoreError>;

    /// A new, unsaved object.
    fn construct(&self) -> Box<dyn DomainObject>;

    /// Persist the object, normalizing field values, and return the
    /// (possibly newly assigned) primary key. Either every field lands or
    /// the save fails with nothing visible to other requests; that atomicity
    /// is the implementation's guarantee.
    fn save(&self, object: Box<dyn DomainObject>) -> Result<String, StoreError>;

    /// Remove the object from storage.
    fn delete(&self, object: Box<dyn DomainObject>) -> Result<(), StoreError>;

    /// The full collection, lazily.
    fn query(&self) -> Result<QueryResult, StoreError>;

    /// Objects whose primary keys are in `pks`. Unmatched keys are simply
    /// absent from the result, never an error.
    fn filter_by_pks(&self, pks: &HashSet<String>) -> Result<QueryResult, StoreError>;
}
