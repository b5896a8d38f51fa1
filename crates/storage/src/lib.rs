//! Storage layer for jsondoc
//!
//! This crate implements the persistence cycle around one JSON file per
//! database:
//! - CatalogFile: whole-file load and whole-file store of a Catalog
//! - WriteMode: in-place overwrite or temp-file + rename replacement
//! - FileLock: optional cross-process exclusive lock file
//!
//! Nothing here caches a catalog between calls; every load reads the file.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod lock;

pub use file::{decode, encode, CatalogFile, WriteMode, TEMP_SUFFIX};
pub use lock::{lock_path, FileLock, LOCK_SUFFIX};
