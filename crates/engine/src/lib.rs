//! Document engine for jsondoc
//!
//! This crate ties the data model and the file layer together:
//! - Store: data directory, configuration, database lifecycle
//! - Database: handle to one database file; every operation is one
//!   load-mutate-store cycle
//! - CollectionHandle: a collection name bound to a database handle
//!
//! Handles to the same file share a writer mutex so concurrent cycles in one
//! process are serialized.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod collection;
pub mod database;
pub mod store;

pub use collection::CollectionHandle;
pub use database::{Database, JsondocConfig, CONFIG_FILE_NAME};
pub use store::Store;

pub use jsondoc_core::{
    Error, FieldSpec, IdPolicy, Map, Predicate, Record, Result, Schema, Value, ValueKind, ID_FIELD,
};
pub use jsondoc_storage::WriteMode;
