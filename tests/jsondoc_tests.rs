//! End-to-end tests through the `jsondoc` facade
//!
//! These walk the documented workflow (create database, create collection,
//! insert, select, update, delete) and check the persisted file after each
//! step, plus reopen and round-trip behavior.

use jsondoc::{Catalog, Error, Map, Predicate, Schema, Store, Value};
use proptest::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn obj(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(m) => m,
        _ => panic!("expected object"),
    }
}

fn file(path: &std::path::Path) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_documented_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path()).unwrap();
    let db = store.create_database("myfirstdb").unwrap();

    db.create_collection(
        "users",
        Schema::new()
            .field("name", "string", true)
            .field("age", "number", false),
    )
    .unwrap();

    db.insert("users", obj(json!({"name": "Alice", "age": 30}))).unwrap();
    db.insert("users", obj(json!({"name": "Bob", "age": 25}))).unwrap();
    db.insert("users", obj(json!({"name": "Carol", "age": 30}))).unwrap();

    let thirty = db
        .select("users", Some(&Predicate::new().field("age", 30)))
        .unwrap();
    assert_eq!(thirty.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![1, 3]);

    db.update(
        "users",
        Some(&Predicate::new().field("name", "Bob")),
        &obj(json!({"age": 26, "email": "bob@example.com"})),
    )
    .unwrap();
    db.delete("users", Some(&Predicate::by_id(1))).unwrap();

    assert_eq!(
        file(db.path()),
        json!({
            "documents": {
                "users": {
                    "schema": {
                        "age": {"type": "number", "required": false},
                        "name": {"type": "string", "required": true}
                    },
                    "data": [
                        {"_id": 2, "name": "Bob", "age": 26, "email": "bob@example.com"},
                        {"_id": 3, "name": "Carol", "age": 30}
                    ]
                }
            }
        })
    );
}

#[test]
fn test_records_written_with_id_first() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path()).unwrap();
    let db = store.create_database("order").unwrap();
    db.create_collection("c", Schema::new()).unwrap();
    db.insert("c", obj(json!({"zeta": 1, "alpha": 2}))).unwrap();

    let text = fs::read_to_string(db.path()).unwrap();
    assert!(text.contains(r#"{"_id":1,"zeta":1,"alpha":2}"#), "{}", text);
}

#[test]
fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = Store::open(temp_dir.path()).unwrap();
        let db = store.create_database("keep").unwrap();
        let notes = db.collection("notes");
        db.create_collection("notes", Schema::new()).unwrap();
        notes.insert(obj(json!({"text": "hello"}))).unwrap();
    }

    let store = Store::open(temp_dir.path()).unwrap();
    assert_eq!(store.list_databases().unwrap(), vec!["keep"]);
    let db = store.connect("keep").unwrap();
    let rows = db.collection("notes").all().unwrap();
    assert_eq!(rows[0].get("text"), Some(&json!("hello")));
}

#[test]
fn test_error_taxonomy_through_facade() {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path()).unwrap();

    assert!(matches!(store.connect("absent"), Err(Error::DatabaseNotFound { .. })));
    let db = store.create_database("e").unwrap();
    assert!(matches!(
        db.select("none", None),
        Err(Error::CollectionNotFound { .. })
    ));
    db.create_collection("c", Schema::new()).unwrap();
    assert!(matches!(
        db.insert("c", obj(json!({"x": null}))),
        Err(Error::InvalidFieldType { .. })
    ));
    assert!(matches!(
        db.update("c", None, &Map::new()),
        Err(Error::MissingPredicate)
    ));
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
        prop::collection::vec(any::<u8>().prop_map(Value::from), 0..3).prop_map(Value::from),
    ]
}

fn record_fields() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-z]{1,4}", scalar(), 0..4)
        .prop_map(|m| m.into_iter().collect::<Map<String, Value>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// A stored file re-stored without changes keeps the same content.
    #[test]
    fn prop_store_load_round_trip(rows in prop::collection::vec(record_fields(), 0..6)) {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(temp_dir.path()).unwrap();
        let db = store.create_database("rt").unwrap();
        db.create_collection("c", Schema::new()).unwrap();
        for row in rows {
            db.insert("c", row).unwrap();
        }

        let before = fs::read(db.path()).unwrap();
        let catalog: Catalog = serde_json::from_slice(&before).unwrap();
        let again = serde_json::to_vec(&catalog).unwrap();
        prop_assert_eq!(before, again);
    }
}
