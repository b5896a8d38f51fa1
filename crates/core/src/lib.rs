//! Core types for jsondoc
//!
//! This crate defines the data model shared by every other crate:
//! - Catalog / Collection: parsed form of a database file
//! - Record: a stored entry with its reserved `_id`
//! - Predicate: conjunctive equality filter
//! - Schema: advisory per-collection field descriptors
//! - ValueKind: runtime type tags checked on insert
//! - Error: the error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod error;
pub mod name;
pub mod predicate;
pub mod record;
pub mod schema;
pub mod value;

pub use catalog::{Catalog, Collection, IdPolicy};
pub use error::{Error, Result};
pub use name::{validate_collection_name, validate_database_name, MAX_DATABASE_NAME_LENGTH};
pub use predicate::{matches_opt, Predicate};
pub use record::{Record, RecordError, ID_FIELD};
pub use schema::{FieldSpec, Schema};
pub use value::{strict_eq, ValueKind, ALLOWED_KINDS};

/// Re-exported so callers build records and predicates without naming serde_json
pub use serde_json::{Map, Value};
