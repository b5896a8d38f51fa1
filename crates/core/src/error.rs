//! Error types for jsondoc
//!
//! Every fallible operation in the workspace returns [`Result`], whose error
//! side is the structured [`Error`] enum below. Variants carry typed fields so
//! callers (and the CLI) can react to the specific failure.
//!
//! | Category | Variants |
//! |----------|----------|
//! | Not Found | `DatabaseNotFound`, `CollectionNotFound` |
//! | Validation | `InvalidFieldType`, `MissingPredicate`, `InvalidName`, `SchemaViolation` |
//! | Storage | `CorruptCatalog`, `DatabaseLocked`, `Io` |
//! | Setup | `Config` |

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::value::ValueKind;

/// Result type alias for jsondoc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document store
#[derive(Debug, Error)]
pub enum Error {
    // ==================== Not Found ====================
    /// No database file with this name exists in the data directory
    #[error("database not found: {name}")]
    DatabaseNotFound {
        /// Database name as given by the caller
        name: String,
    },

    /// The catalog has no collection with this name
    #[error("collection not found: {collection}")]
    CollectionNotFound {
        /// Collection name as given by the caller
        collection: String,
    },

    // ==================== Validation ====================
    /// A record field has a value kind outside the allowed set
    #[error("type of field '{field}' is {kind}, allowed types are string, number, boolean, object, array")]
    InvalidFieldType {
        /// Offending field name
        field: String,
        /// Kind of the rejected value
        kind: ValueKind,
    },

    /// Update was called without a predicate (or with an empty one)
    #[error("no where clause provided: update requires a non-empty predicate")]
    MissingPredicate,

    /// Database or collection name failed validation
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Record does not satisfy the collection schema (enforcement enabled)
    #[error("schema violation in collection '{collection}': {reason}")]
    SchemaViolation {
        /// Collection whose schema was violated
        collection: String,
        /// Description of the violation
        reason: String,
    },

    // ==================== Storage ====================
    /// The database file is missing, unreadable, or not a valid catalog
    #[error("corrupt catalog at {}: {reason}", .path.display())]
    CorruptCatalog {
        /// Path of the database file
        path: PathBuf,
        /// Underlying read or parse failure
        reason: String,
    },

    /// Another process holds the database lock file
    #[error("database at {} is locked by another process", .path.display())]
    DatabaseLocked {
        /// Path of the database file
        path: PathBuf,
    },

    /// I/O failure while writing or removing a file
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File the operation was acting on
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    // ==================== Setup ====================
    /// Invalid or unreadable configuration
    #[error("configuration error: {reason}")]
    Config {
        /// Description of the problem
        reason: String,
    },
}

impl Error {
    /// Build an [`Error::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an [`Error::CorruptCatalog`] for `path`.
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::CorruptCatalog {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an [`Error::CollectionNotFound`].
    pub fn collection_not_found(collection: impl Into<String>) -> Self {
        Error::CollectionNotFound {
            collection: collection.into(),
        }
    }

    /// Build an [`Error::SchemaViolation`].
    pub fn schema_violation(collection: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SchemaViolation {
            collection: collection.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for the "not found" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::DatabaseNotFound { .. } | Error::CollectionNotFound { .. }
        )
    }
}
