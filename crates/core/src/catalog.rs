//! Catalog and Collection: the in-memory form of one database file
//!
//! ```text
//! {"documents": {<name>: {"schema": {...}, "data": [{"_id": 1, ...}, ...]}}}
//! ```
//!
//! Keys this crate does not know about are kept in `extra` maps so a
//! load/store round trip does not drop them.
//!
//! All record mutation goes through [`Collection`] methods that walk the live
//! record sequence once and act on matching identities. Nothing here ever
//! derives an array position from an `_id`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::predicate::Predicate;
use crate::record::Record;
use crate::schema::Schema;

// =============================================================================
// Identifier Policy
// =============================================================================

/// How new record identifiers are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// `max(existing _id) + 1`, or 1 for an empty collection
    #[default]
    MaxPlusOne,
    /// Persisted per-collection counter; identifiers are never reused
    Sequence,
}

impl IdPolicy {
    /// Config-file spelling
    pub fn as_str(self) -> &'static str {
        match self {
            IdPolicy::MaxPlusOne => "max_plus_one",
            IdPolicy::Sequence => "sequence",
        }
    }
}

// =============================================================================
// Collection
// =============================================================================

/// A named store of records (the file calls these "documents")
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Absent in hand-written files that never declared one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    schema: Option<Schema>,

    /// Absent until the first write materializes it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Vec<Record>>,

    /// Next identifier under [`IdPolicy::Sequence`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_id: Option<u64>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Collection {
    /// New collection with no `data` key
    pub fn new(schema: Schema) -> Self {
        Collection {
            schema: Some(schema),
            ..Default::default()
        }
    }

    /// Advisory schema descriptor, if the collection declares one
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Records in stored order (empty if `data` was never materialized)
    pub fn records(&self) -> &[Record] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Mutable access to the records, materializing `data` if absent
    pub fn records_mut(&mut self) -> &mut Vec<Record> {
        self.data.get_or_insert_with(Vec::new)
    }

    /// Whether `data` has been materialized
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records().len()
    }

    /// True if there are no records
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Highest identifier in use
    pub fn max_id(&self) -> Option<u64> {
        self.records().iter().map(Record::id).max()
    }

    /// Persisted sequence counter, if any
    pub fn next_id(&self) -> Option<u64> {
        self.next_id
    }

    /// Choose the identifier for the next insert and advance any counter.
    pub fn allocate_id(&mut self, policy: IdPolicy) -> u64 {
        let after_max = self.max_id().map_or(1, |m| m.saturating_add(1));
        match policy {
            IdPolicy::MaxPlusOne => after_max,
            IdPolicy::Sequence => {
                let id = self.next_id.unwrap_or(1).max(after_max);
                self.next_id = Some(id.saturating_add(1));
                id
            }
        }
    }

    /// Append a record
    pub fn push(&mut self, record: Record) {
        self.records_mut().push(record);
    }

    /// Clone out matching records (all of them when `predicate` is `None`)
    pub fn select(&self, predicate: Option<&Predicate>) -> Vec<Record> {
        match predicate {
            Some(p) => p.filter(self.records()),
            None => self.records().to_vec(),
        }
    }

    /// Remove every record. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let records = self.records_mut();
        let removed = records.len();
        records.clear();
        removed
    }

    /// Remove exactly the records matching `predicate`, in one retain pass.
    /// Returns how many were removed.
    pub fn remove_matching(&mut self, predicate: &Predicate) -> usize {
        let records = self.records_mut();
        let before = records.len();
        records.retain(|r| !predicate.matches(r));
        before - records.len()
    }

    /// Merge `patch` into every record matching `predicate`, in place.
    /// Returns how many records matched.
    pub fn update_matching(&mut self, predicate: &Predicate, patch: &Map<String, Value>) -> usize {
        let mut matched = 0;
        for record in self.records_mut().iter_mut() {
            if predicate.matches(record) {
                record.merge(patch);
                matched += 1;
            }
        }
        matched
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Parsed form of a whole database file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Collections by name
    pub documents: BTreeMap<String, Collection>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Catalog {
    /// Empty catalog (`{"documents": {}}`)
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Look up a collection
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.documents.get(name)
    }

    /// Look up a collection mutably
    pub fn collection_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.documents.get_mut(name)
    }

    /// Look up a collection or fail with `CollectionNotFound`
    pub fn require(&self, name: &str) -> crate::Result<&Collection> {
        self.collection(name)
            .ok_or_else(|| crate::Error::collection_not_found(name))
    }

    /// Mutable variant of [`Catalog::require`]
    pub fn require_mut(&mut self, name: &str) -> crate::Result<&mut Collection> {
        self.collection_mut(name)
            .ok_or_else(|| crate::Error::collection_not_found(name))
    }

    /// Create (or silently replace) a collection. Returns the replaced one.
    pub fn create_collection(&mut self, name: impl Into<String>, schema: Schema) -> Option<Collection> {
        self.documents.insert(name.into(), Collection::new(schema))
    }

    /// Collection names in sorted order
    pub fn collection_names(&self) -> Vec<String> {
        self.documents.keys().cloned().collect()
    }
}
