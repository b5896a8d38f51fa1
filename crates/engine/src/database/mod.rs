//! Database handle and the collection engine
//!
//! A [`Database`] is an explicit handle to one database file. Every operation
//! runs one load-mutate-store cycle against that file:
//!
//! 1. take the per-path writer mutex (and the lock file, if configured)
//! 2. load the whole catalog
//! 3. apply the operation in memory
//! 4. store the whole catalog (mutating operations only)
//!
//! Any error before step 4 returns without touching the file, so no operation
//! partially applies.
//!
//! Handles are cheap to clone; clones and handles opened separately for the
//! same path share one writer mutex through the process-wide registry.

pub mod config;
mod registry;

pub use config::{JsondocConfig, CONFIG_FILE_NAME};

use crate::collection::CollectionHandle;
use jsondoc_core::{
    validate_collection_name, Catalog, Error, IdPolicy, Map, Predicate, Record, Result, Schema,
    Value, ValueKind, ID_FIELD,
};
use jsondoc_storage::{CatalogFile, FileLock};
use registry::WriterLock;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ============================================================================
// Options
// ============================================================================

/// Per-handle behavior derived from [`JsondocConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DatabaseOptions {
    pub(crate) id_policy: IdPolicy,
    pub(crate) enforce_schema: bool,
    pub(crate) lock_file: bool,
}

impl DatabaseOptions {
    pub(crate) fn from_config(config: &JsondocConfig) -> Result<Self> {
        Ok(DatabaseOptions {
            id_policy: config.id_policy()?,
            enforce_schema: config.enforce_schema,
            lock_file: config.lock_file,
        })
    }
}

// ============================================================================
// Database
// ============================================================================

/// Handle to one database file
///
/// Obtain one from [`crate::Store::create_database`] or
/// [`crate::Store::connect`].
///
/// # Example
///
/// ```text
/// let store = Store::open("./data")?;
/// let db = store.create_database("myfirstdb")?;
/// db.create_collection("users", Schema::new().field("name", "string", true))?;
/// let alice = db.insert("users", fields)?;
/// let rows = db.select("users", Some(&Predicate::by_id(alice.id())))?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    name: String,
    file: CatalogFile,
    writer: WriterLock,
    options: DatabaseOptions,
}

impl Database {
    pub(crate) fn new(name: &str, file: CatalogFile, options: DatabaseOptions) -> Self {
        let writer = registry::writer_for(file.path());
        Database {
            name: name.to_string(),
            file,
            writer,
            options,
        }
    }

    /// Database name (file stem)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Identifier policy in effect for inserts
    pub fn id_policy(&self) -> IdPolicy {
        self.options.id_policy
    }

    /// Whether inserts and updates are checked against collection schemas
    pub fn enforces_schema(&self) -> bool {
        self.options.enforce_schema
    }

    /// Bind a collection name to this handle
    pub fn collection(&self, name: impl Into<String>) -> CollectionHandle<'_> {
        CollectionHandle::new(self, name.into())
    }

    // ========================================================================
    // Cycle
    // ========================================================================

    fn file_lock(&self) -> Result<Option<FileLock>> {
        if self.options.lock_file {
            FileLock::try_acquire(self.file.path()).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Load-only cycle. Never stores.
    fn read<T>(&self, f: impl FnOnce(&Catalog) -> Result<T>) -> Result<T> {
        let _writer = self.writer.lock();
        let _lock = self.file_lock()?;
        let catalog = self.file.load()?;
        f(&catalog)
    }

    /// Load-mutate-store cycle. Stores only if `f` succeeds.
    fn write<T>(&self, f: impl FnOnce(&mut Catalog) -> Result<T>) -> Result<T> {
        let _writer = self.writer.lock();
        let _lock = self.file_lock()?;
        let mut catalog = self.file.load()?;
        let out = f(&mut catalog)?;
        self.file.store(&catalog)?;
        Ok(out)
    }

    /// Replace the file with `catalog` without loading it first.
    pub(crate) fn reset(&self, catalog: &Catalog) -> Result<()> {
        let _writer = self.writer.lock();
        let _lock = self.file_lock()?;
        self.file.store(catalog)
    }

    /// Remove the database file.
    pub(crate) fn remove_file(&self) -> Result<()> {
        let _writer = self.writer.lock();
        let _lock = self.file_lock()?;
        std::fs::remove_file(self.file.path()).map_err(|e| Error::io(self.file.path(), e))
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> Result<Vec<String>> {
        self.read(|catalog| Ok(catalog.collection_names()))
    }

    /// Schema of a collection
    pub fn schema(&self, collection: &str) -> Result<Schema> {
        self.read(|catalog| {
            let coll = catalog.require(collection)?;
            Ok(coll.schema().cloned().unwrap_or_default())
        })
    }

    /// Create a collection with an advisory schema.
    ///
    /// An existing collection of the same name is replaced, records included.
    pub fn create_collection(&self, name: &str, schema: Schema) -> Result<()> {
        validate_collection_name(name)?;
        if self.options.enforce_schema {
            schema
                .check_definition()
                .map_err(|reason| Error::schema_violation(name, reason))?;
        }
        let fields = schema.len();
        let replaced = self.write(|catalog| Ok(catalog.create_collection(name, schema)))?;
        if let Some(old) = replaced {
            debug!(
                target: "jsondoc::db",
                db = %self.name,
                collection = name,
                dropped_records = old.len(),
                "Replaced existing collection"
            );
        }
        info!(target: "jsondoc::db", db = %self.name, collection = name, fields, "Created collection");
        Ok(())
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Insert a record and return it as stored, `_id` included.
    ///
    /// A `_id` key in `fields` is ignored; the identifier comes from the
    /// configured [`IdPolicy`].
    ///
    /// # Errors
    ///
    /// - `CollectionNotFound` if the collection does not exist
    /// - `InvalidFieldType` if a field value is `null`
    /// - `SchemaViolation` if schema enforcement is on and the record fails it
    pub fn insert(&self, collection: &str, mut fields: Map<String, Value>) -> Result<Record> {
        fields.shift_remove(ID_FIELD);
        let record = self.write(|catalog| {
            let coll = catalog.require_mut(collection)?;
            check_kinds(&fields)?;
            if let Some(schema) = coll.schema().filter(|_| self.options.enforce_schema) {
                schema
                    .check_record(&fields)
                    .map_err(|reason| Error::schema_violation(collection, reason))?;
            }
            let id = coll.allocate_id(self.options.id_policy);
            let record = Record::new(id, fields);
            coll.push(record.clone());
            Ok(record)
        })?;
        debug!(target: "jsondoc::db", db = %self.name, collection, id = record.id(), "Inserted record");
        Ok(record)
    }

    /// Records matching `predicate` (all records when `None`), in stored order.
    pub fn select(&self, collection: &str, predicate: Option<&Predicate>) -> Result<Vec<Record>> {
        self.read(|catalog| Ok(catalog.require(collection)?.select(predicate)))
    }

    /// Delete matching records (all records when `None`).
    ///
    /// Returns the number of records removed.
    pub fn delete(&self, collection: &str, predicate: Option<&Predicate>) -> Result<usize> {
        let removed = self.write(|catalog| {
            let coll = catalog.require_mut(collection)?;
            Ok(match predicate {
                Some(p) => coll.remove_matching(p),
                None => coll.clear(),
            })
        })?;
        debug!(target: "jsondoc::db", db = %self.name, collection, removed, "Deleted records");
        Ok(removed)
    }

    /// Merge `patch` into every record matching `predicate`.
    ///
    /// `_id` in the patch is ignored. Returns the number of records matched.
    ///
    /// # Errors
    ///
    /// - `CollectionNotFound` if the collection does not exist
    /// - `MissingPredicate` if `predicate` is `None` or empty
    /// - `SchemaViolation` if schema enforcement is on and a merged record fails it
    pub fn update(
        &self,
        collection: &str,
        predicate: Option<&Predicate>,
        patch: &Map<String, Value>,
    ) -> Result<usize> {
        let updated = self.write(|catalog| {
            let coll = catalog.require_mut(collection)?;
            let predicate = match predicate {
                Some(p) if !p.is_empty() => p,
                _ => return Err(Error::MissingPredicate),
            };
            if let Some(schema) = coll.schema().filter(|_| self.options.enforce_schema) {
                for record in coll.records().iter().filter(|r| predicate.matches(r)) {
                    let mut merged = record.clone();
                    merged.merge(patch);
                    schema
                        .check_record(merged.as_map())
                        .map_err(|reason| Error::schema_violation(collection, reason))?;
                }
            }
            Ok(coll.update_matching(predicate, patch))
        })?;
        debug!(target: "jsondoc::db", db = %self.name, collection, updated, "Updated records");
        Ok(updated)
    }
}

/// Reject field values whose kind is not insertable.
fn check_kinds(fields: &Map<String, Value>) -> Result<()> {
    for (field, value) in fields {
        let kind = ValueKind::of(value);
        if !kind.is_allowed() {
            return Err(Error::InvalidFieldType {
                field: field.clone(),
                kind,
            });
        }
    }
    Ok(())
}

/// Path of the database file `name` inside `data_dir`
pub(crate) fn database_file(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join(format!("{}.json", name))
}
