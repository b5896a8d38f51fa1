//! Multi-threaded write tests
//!
//! Handles to the same file, whether cloned or opened separately, must
//! serialize their load-mutate-store cycles so no update is lost.

use jsondoc_engine::{Error, JsondocConfig, Map, Predicate, Schema, Store, Value};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 4;
const INSERTS_PER_THREAD: usize = 25;

fn obj(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => panic!("expected object"),
    }
}

/// Two separately connected handles inserting from threads lose nothing.
#[test]
fn test_separate_handles_lose_no_inserts() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path()).unwrap();
    store
        .create_database("shared")
        .unwrap()
        .create_collection("events", Schema::new())
        .unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            // Every thread connects on its own; nothing is shared but the path.
            let db = store.connect("shared").unwrap();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..INSERTS_PER_THREAD {
                    db.insert("events", obj(json!({"thread": t, "seq": i})))
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let db = store.connect("shared").unwrap();
    let records = db.select("events", None).unwrap();
    assert_eq!(records.len(), THREADS * INSERTS_PER_THREAD);

    let ids: HashSet<u64> = records.iter().map(|r| r.id()).collect();
    assert_eq!(ids.len(), records.len());
}

/// Concurrent updates of disjoint records all land.
#[test]
fn test_concurrent_updates_all_apply() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path()).unwrap();
    let db = store.create_database("counters").unwrap();
    db.create_collection("c", Schema::new()).unwrap();
    for t in 0..THREADS {
        db.insert("c", obj(json!({"slot": t, "hits": 0}))).unwrap();
    }

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let db = db.clone();
            thread::spawn(move || {
                let pred = Predicate::new().field("slot", t as u64);
                db.update("c", Some(&pred), &obj(json!({"hits": 1, "by": t})))
                    .unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for record in db.select("c", None).unwrap() {
        assert_eq!(record.get("hits"), Some(&json!(1)));
        assert_eq!(record.get("by"), record.get("slot"));
    }
}

/// With `lock_file` on, a lock held elsewhere makes the cycle fail fast.
#[test]
fn test_lock_file_held_elsewhere_reports_locked() {
    use fs2::FileExt;

    let temp_dir = TempDir::new().unwrap();
    let config = JsondocConfig {
        lock_file: true,
        ..JsondocConfig::default()
    };
    let store = Store::open_with(temp_dir.path(), config).unwrap();
    let db = store.create_database("locked").unwrap();
    db.create_collection("t", Schema::new()).unwrap();

    let lock_path = temp_dir.path().join("locked.json.lock");
    assert!(lock_path.exists());

    // Stands in for another process holding the lock.
    let foreign = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(&lock_path)
        .unwrap();
    foreign.lock_exclusive().unwrap();

    let err = db.insert("t", Map::new()).unwrap_err();
    assert!(matches!(err, Error::DatabaseLocked { .. }));

    FileExt::unlock(&foreign).unwrap();
    assert_eq!(db.insert("t", Map::new()).unwrap().id(), 1);
}
