//! Store: database lifecycle rooted at a data directory
//!
//! Each database is one `<name>.json` file inside the data directory. The
//! directory also holds `jsondoc.toml`, written with commented defaults the
//! first time the store is opened.
//!
//! ```text
//! data/
//! ├── jsondoc.toml
//! ├── myfirstdb.json
//! └── inventory.json
//! ```

use crate::database::{database_file, Database, DatabaseOptions, JsondocConfig, CONFIG_FILE_NAME};
use jsondoc_core::{validate_database_name, Catalog, Error, Result};
use jsondoc_storage::{lock_path, CatalogFile, WriteMode};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Entry point: a data directory and the configuration applied to every
/// database handle opened from it
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
    config: JsondocConfig,
    write_mode: WriteMode,
    options: DatabaseOptions,
}

impl Store {
    /// Open a store, creating the directory and `jsondoc.toml` if missing.
    ///
    /// # Errors
    ///
    /// - `Io` if the directory cannot be created
    /// - `Config` if `jsondoc.toml` cannot be parsed or has invalid values
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        fs::create_dir_all(data_dir).map_err(|e| Error::io(data_dir, e))?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        JsondocConfig::write_default_if_missing(&config_path)?;
        let config = JsondocConfig::from_file(&config_path)?;

        Self::open_with(data_dir, config)
    }

    /// Open a store with an explicit configuration, ignoring `jsondoc.toml`.
    pub fn open_with(data_dir: impl AsRef<Path>, config: JsondocConfig) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        let write_mode = config.write_mode()?;
        let options = DatabaseOptions::from_config(&config)?;

        fs::create_dir_all(data_dir).map_err(|e| Error::io(data_dir, e))?;
        let data_dir = data_dir.canonicalize().map_err(|e| Error::io(data_dir, e))?;

        info!(
            target: "jsondoc::store",
            path = %data_dir.display(),
            write_mode = write_mode.as_str(),
            id_policy = options.id_policy.as_str(),
            enforce_schema = options.enforce_schema,
            lock_file = options.lock_file,
            "Opened store"
        );

        Ok(Store {
            data_dir,
            config,
            write_mode,
            options,
        })
    }

    /// Canonical data directory
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Configuration in effect
    pub fn config(&self) -> &JsondocConfig {
        &self.config
    }

    /// Path of the file backing database `name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if `name` is not a valid database name.
    pub fn database_path(&self, name: &str) -> Result<PathBuf> {
        validate_database_name(name)?;
        Ok(database_file(&self.data_dir, name))
    }

    fn catalog_file(&self, path: PathBuf) -> CatalogFile {
        CatalogFile::new(path)
            .with_write_mode(self.write_mode)
            .with_pretty(self.config.pretty)
    }

    /// Whether a database file named `name` exists
    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.database_path(name)?.is_file())
    }

    /// Create database `name` with an empty catalog and return a handle.
    ///
    /// An existing file of the same name is replaced.
    pub fn create_database(&self, name: &str) -> Result<Database> {
        let path = self.database_path(name)?;
        let file = self.catalog_file(path);
        let db = Database::new(name, file.clone(), self.options);

        let existed = file.exists();
        db.reset(&Catalog::new())?;
        if existed {
            warn!(
                target: "jsondoc::store",
                db = name,
                path = %file.path().display(),
                "Replaced existing database file"
            );
        }
        info!(target: "jsondoc::store", db = name, "Created database");
        Ok(db)
    }

    /// Open a handle to existing database `name`.
    ///
    /// The file is loaded once so a bad catalog is reported here rather than
    /// on the first operation.
    ///
    /// # Errors
    ///
    /// - `DatabaseNotFound` if there is no such file
    /// - `CorruptCatalog` if the file does not parse as a catalog
    pub fn connect(&self, name: &str) -> Result<Database> {
        let db = self.existing(name)?;
        let collections = db.collection_names()?.len();
        debug!(target: "jsondoc::store", db = name, collections, "Connected");
        Ok(db)
    }

    /// Handle to an existing database file, without loading it
    fn existing(&self, name: &str) -> Result<Database> {
        let path = self.database_path(name)?;
        if !path.is_file() {
            return Err(Error::DatabaseNotFound {
                name: name.to_string(),
            });
        }
        Ok(Database::new(name, self.catalog_file(path), self.options))
    }

    /// Remove database `name` and its lock file.
    ///
    /// Existing handles stay valid values but every further operation on them
    /// fails with `CorruptCatalog`.
    pub fn delete_database(&self, name: &str) -> Result<()> {
        let db = self.existing(name)?;
        db.remove_file()?;
        let lock = lock_path(db.path());
        match fs::remove_file(&lock) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(lock, e)),
        }
        info!(target: "jsondoc::store", db = name, "Deleted database");
        Ok(())
    }

    /// Names of all databases in the data directory, sorted
    pub fn list_databases(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.data_dir).map_err(|e| Error::io(&self.data_dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.data_dir, e))?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_database_name(stem).is_ok() {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_writes_default_config() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("data")).unwrap();
        assert!(store.data_dir().join(CONFIG_FILE_NAME).is_file());
        assert_eq!(store.config(), &JsondocConfig::default());
    }

    #[test]
    fn test_open_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "id_policy = \"length\"\n").unwrap();
        assert!(matches!(Store::open(dir.path()), Err(Error::Config { .. })));
    }

    #[test]
    fn test_database_path_validates_name() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert!(store.database_path("ok_name").is_ok());
        assert!(matches!(
            store.database_path("../escape"),
            Err(Error::InvalidName { .. })
        ));
    }

    #[test]
    fn test_list_skips_non_databases() {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store.create_database("b").unwrap();
        store.create_database("a").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("a.json.tmp"), "x").unwrap();
        fs::write(dir.path().join("bad name.json"), "{}").unwrap();
        assert_eq!(store.list_databases().unwrap(), vec!["a", "b"]);
    }
}
