//! Collection handle
//!
//! A [`CollectionHandle`] binds a collection name to a [`Database`] so callers
//! working on one collection do not repeat its name on every call. It adds no
//! state; each call is a full cycle on the parent database.

use crate::database::Database;
use jsondoc_core::{Map, Predicate, Record, Result, Schema, Value};

/// A collection name bound to a database handle
#[derive(Debug, Clone)]
pub struct CollectionHandle<'a> {
    db: &'a Database,
    name: String,
}

impl<'a> CollectionHandle<'a> {
    pub(crate) fn new(db: &'a Database, name: String) -> Self {
        CollectionHandle { db, name }
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent database
    pub fn database(&self) -> &'a Database {
        self.db
    }

    /// See [`Database::schema`]
    pub fn schema(&self) -> Result<Schema> {
        self.db.schema(&self.name)
    }

    /// See [`Database::insert`]
    pub fn insert(&self, fields: Map<String, Value>) -> Result<Record> {
        self.db.insert(&self.name, fields)
    }

    /// See [`Database::select`]
    pub fn select(&self, predicate: Option<&Predicate>) -> Result<Vec<Record>> {
        self.db.select(&self.name, predicate)
    }

    /// All records
    pub fn all(&self) -> Result<Vec<Record>> {
        self.select(None)
    }

    /// See [`Database::delete`]
    pub fn delete(&self, predicate: Option<&Predicate>) -> Result<usize> {
        self.db.delete(&self.name, predicate)
    }

    /// See [`Database::update`]
    pub fn update(&self, predicate: &Predicate, patch: &Map<String, Value>) -> Result<usize> {
        self.db.update(&self.name, Some(predicate), patch)
    }
}
