//! Whole-file catalog persistence
//!
//! A [`CatalogFile`] owns the path of one database file and performs the two
//! halves of the persistence cycle:
//!
//! - [`CatalogFile::load`]: read the entire file, parse it as UTF-8 JSON into a
//!   [`Catalog`]. Missing, unreadable or malformed files are `CorruptCatalog`.
//! - [`CatalogFile::store`]: serialize the entire catalog and replace the file
//!   contents in one write.
//!
//! There is no partial I/O and no append log. How the replacement happens is
//! controlled by [`WriteMode`].

use jsondoc_core::{Catalog, Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Suffix of the temp file used by [`WriteMode::Atomic`]
pub const TEMP_SUFFIX: &str = ".tmp";

/// How [`CatalogFile::store`] replaces the file contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Write a sibling temp file, fsync it, then rename it over the target.
    /// A crash leaves either the old or the new catalog, never a torn one.
    #[default]
    Atomic,
    /// Truncate and write the target in place. No fsync.
    Overwrite,
}

impl WriteMode {
    /// Config-file spelling
    pub fn as_str(self) -> &'static str {
        match self {
            WriteMode::Atomic => "atomic",
            WriteMode::Overwrite => "overwrite",
        }
    }
}

/// One database file on disk
#[derive(Debug, Clone)]
pub struct CatalogFile {
    path: PathBuf,
    mode: WriteMode,
    pretty: bool,
}

impl CatalogFile {
    /// Handle for `path` with default settings (atomic, compact)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CatalogFile {
            path: path.into(),
            mode: WriteMode::default(),
            pretty: false,
        }
    }

    /// Set the write mode
    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Pretty-print JSON on store
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Configured write mode
    pub fn write_mode(&self) -> WriteMode {
        self.mode
    }

    /// Whether the file exists
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Read and parse the whole file.
    pub fn load(&self) -> Result<Catalog> {
        let bytes = fs::read(&self.path).map_err(|e| Error::corrupt(&self.path, e))?;
        let catalog = decode(&self.path, &bytes)?;
        debug!(
            target: "jsondoc::storage",
            path = %self.path.display(),
            bytes = bytes.len(),
            collections = catalog.documents.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Serialize the whole catalog and replace the file.
    pub fn store(&self, catalog: &Catalog) -> Result<()> {
        let bytes = encode(catalog, self.pretty).map_err(|e| Error::io(&self.path, e.into()))?;
        match self.mode {
            WriteMode::Overwrite => {
                fs::write(&self.path, &bytes).map_err(|e| Error::io(&self.path, e))?;
            }
            WriteMode::Atomic => self.replace_atomically(&bytes)?,
        }
        debug!(
            target: "jsondoc::storage",
            path = %self.path.display(),
            bytes = bytes.len(),
            mode = self.mode.as_str(),
            "Stored catalog"
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(TEMP_SUFFIX);
        PathBuf::from(name)
    }

    fn replace_atomically(&self, bytes: &[u8]) -> Result<()> {
        let tmp = self.temp_path();
        let written = (|| {
            let mut file = File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()
        })();
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(Error::io(&tmp, e));
        }
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::io(&self.path, e)
        })
    }
}

/// Serialize a catalog to JSON bytes
pub fn encode(catalog: &Catalog, pretty: bool) -> serde_json::Result<Vec<u8>> {
    if pretty {
        serde_json::to_vec_pretty(catalog)
    } else {
        serde_json::to_vec(catalog)
    }
}

/// Parse JSON bytes read from `path` into a catalog
pub fn decode(path: &Path, bytes: &[u8]) -> Result<Catalog> {
    serde_json::from_slice(bytes).map_err(|e| Error::corrupt(path, e))
}
