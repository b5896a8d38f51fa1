//! Process-wide writer registry
//!
//! Every `Database` handle for the same file shares one writer mutex, so the
//! load-mutate-store cycles of handles opened independently in one process
//! are serialized and cannot lose each other's updates.
//!
//! The registry holds weak references keyed by file path; an entry is
//! recreated on demand once every handle for that path has been dropped.
//!
//! Uses parking_lot::Mutex to avoid lock poisoning when a caller panics
//! mid-operation.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

/// Writer mutex shared by all handles to one database file
pub type WriterLock = Arc<Mutex<()>>;

/// Global registry of writer mutexes (path -> weak reference)
static WRITERS: Lazy<Mutex<HashMap<PathBuf, Weak<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Get (or create) the writer mutex for `path`.
pub(crate) fn writer_for(path: &Path) -> WriterLock {
    let mut registry = WRITERS.lock();

    if let Some(existing) = registry.get(path).and_then(Weak::upgrade) {
        return existing;
    }

    // Not registered (or expired). Prune dead entries while the lock is held.
    registry.retain(|_, weak| weak.strong_count() > 0);

    let writer = Arc::new(Mutex::new(()));
    registry.insert(path.to_path_buf(), Arc::downgrade(&writer));
    writer
}
