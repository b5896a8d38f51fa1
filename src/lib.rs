//! jsondoc - a minimal JSON-file document store
//!
//! Each database is a single JSON file holding named collections of records.
//! Every record carries a reserved integer `_id`. Records are queried with
//! conjunctive equality predicates, and every operation runs one whole-file
//! load-mutate-store cycle.
//!
//! # Quick Start
//!
//! ```no_run
//! use jsondoc::{Map, Predicate, Schema, Store, Value};
//!
//! # fn main() -> jsondoc::Result<()> {
//! let store = Store::open("./data")?;
//! let db = store.create_database("myfirstdb")?;
//! db.create_collection("users", Schema::new().field("name", "string", true))?;
//!
//! let mut fields = Map::new();
//! fields.insert("name".into(), Value::from("Alice"));
//! let alice = db.insert("users", fields)?;
//!
//! let found = db.select("users", Some(&Predicate::by_id(alice.id())))?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `jsondoc-core`: data model (catalog, records, predicates, schema, errors)
//! - `jsondoc-storage`: whole-file load/store and the optional lock file
//! - `jsondoc-engine`: store lifecycle, database handles, configuration

pub use jsondoc_engine::{
    CollectionHandle, Database, JsondocConfig, Store, WriteMode, CONFIG_FILE_NAME,
};

pub use jsondoc_core::{
    strict_eq, Catalog, Collection, Error, FieldSpec, IdPolicy, Map, Predicate, Record, Result,
    Schema, Value, ValueKind, ID_FIELD,
};
