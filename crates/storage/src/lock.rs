//! Cross-process lock file
//!
//! When enabled, each load-mutate-store cycle holds an exclusive advisory lock
//! on `<database file>.lock`. The lock is taken with a non-blocking attempt;
//! if another process holds it the cycle fails with `DatabaseLocked` instead of
//! waiting. The lock is released when the guard is dropped.

use fs2::FileExt;
use jsondoc_core::{Error, Result};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Suffix appended to the database file name
pub const LOCK_SUFFIX: &str = ".lock";

/// Path of the lock file for a database file
pub fn lock_path(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(LOCK_SUFFIX);
    PathBuf::from(name)
}

/// Held exclusive lock; released on drop
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Try to take the exclusive lock for `db_path` without blocking.
    pub fn try_acquire(db_path: &Path) -> Result<FileLock> {
        let path = lock_path(db_path);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        file.try_lock_exclusive().map_err(|_| Error::DatabaseLocked {
            path: db_path.to_path_buf(),
        })?;
        trace!(target: "jsondoc::storage", path = %path.display(), "Acquired lock file");
        Ok(FileLock { file, path })
    }

    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        trace!(target: "jsondoc::storage", path = %self.path.display(), "Released lock file");
    }
}
