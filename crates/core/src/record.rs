//! Record: one entry of a collection
//!
//! A record is a flat JSON object carrying the reserved integer field `_id`.
//! On disk it is written with `_id` first, followed by the user fields in
//! insertion order.
//!
//! The `_id` entry lives inside the field map so predicates can match on it
//! like any other field; constructors and [`Record::merge`] keep the cached
//! identifier and the map entry in sync.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name of the reserved identifier field
pub const ID_FIELD: &str = "_id";

/// A stored record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Record {
    id: u64,
    fields: Map<String, Value>,
}

/// Error when a JSON object cannot be read as a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The object has no `_id` key
    MissingId,
    /// `_id` is present but not a non-negative integer
    InvalidId(String),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::MissingId => write!(f, "record has no '{}' field", ID_FIELD),
            RecordError::InvalidId(found) => write!(
                f,
                "record '{}' must be a non-negative integer, found {}",
                ID_FIELD, found
            ),
        }
    }
}

impl std::error::Error for RecordError {}

impl Record {
    /// Build a record from user fields and an assigned identifier.
    ///
    /// Any `_id` key in `fields` is dropped; `id` always wins.
    pub fn new(id: u64, fields: Map<String, Value>) -> Self {
        let mut body = Map::with_capacity(fields.len() + 1);
        body.insert(ID_FIELD.to_string(), Value::from(id));
        for (key, value) in fields {
            if key != ID_FIELD {
                body.insert(key, value);
            }
        }
        Record { id, fields: body }
    }

    /// The record identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Look up a field, `_id` included
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// All fields, `_id` first
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// User fields, without `_id`
    pub fn user_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter().filter(|(k, _)| k.as_str() != ID_FIELD)
    }

    /// Field names, `_id` first
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Shallow-merge `patch` over this record's fields.
    ///
    /// Existing keys keep their position, new keys are appended. A `_id` key
    /// in the patch is ignored. Returns true if any field value changed.
    pub fn merge(&mut self, patch: &Map<String, Value>) -> bool {
        let mut changed = false;
        for (key, value) in patch {
            if key == ID_FIELD {
                continue;
            }
            if self.fields.get(key) != Some(value) {
                self.fields.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }

    /// Convert into a plain JSON object value
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Map<String, Value>> for Record {
    type Error = RecordError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match fields.get(ID_FIELD) {
            None => return Err(RecordError::MissingId),
            Some(v) => v
                .as_u64()
                .ok_or_else(|| RecordError::InvalidId(v.to_string()))?,
        };
        // `new` moves `_id` to the front and keeps the user fields in order.
        Ok(Record::new(id, fields))
    }
}

impl From<Record> for Map<String, Value> {
    fn from(record: Record) -> Self {
        record.fields
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        record.into_value()
    }
}
