//! Collection schema descriptors
//!
//! A schema maps field names to `{type, required}` specs. It is recorded with
//! the collection and, by default, never enforced. When enforcement is turned
//! on, [`Schema::check_definition`] and [`Schema::check_record`] are applied by
//! the engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::value::ValueKind;

/// Spec for a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Declared type name (`string`, `number`, `boolean`, `object`, `array`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the field must be present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl FieldSpec {
    /// Create a spec
    pub fn new(kind: impl Into<String>, required: bool) -> Self {
        FieldSpec {
            kind: kind.into(),
            required: Some(required),
        }
    }

    /// Whether the field is required (absent means optional)
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }
}

/// Field name → spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema(BTreeMap<String, FieldSpec>);

impl Schema {
    /// Empty schema
    pub fn new() -> Self {
        Schema(BTreeMap::new())
    }

    /// Builder: add a field
    pub fn field(mut self, name: impl Into<String>, kind: impl Into<String>, required: bool) -> Self {
        self.0.insert(name.into(), FieldSpec::new(kind, required));
        self
    }

    /// Look up a field spec
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.0.get(name)
    }

    /// Iterate field specs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldSpec)> {
        self.0.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no fields are declared
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every declared type is an insertable kind.
    pub fn check_definition(&self) -> Result<(), String> {
        for (name, spec) in &self.0 {
            match spec.kind.parse::<ValueKind>() {
                Ok(kind) if kind.is_allowed() => {}
                Ok(kind) => {
                    return Err(format!("field '{}' declares disallowed type {}", name, kind))
                }
                Err(e) => return Err(format!("field '{}': {}", name, e)),
            }
        }
        Ok(())
    }

    /// Check a record body against the schema.
    ///
    /// Required fields must be present; present fields that the schema names
    /// must have the declared kind. Undeclared fields are allowed.
    pub fn check_record(&self, fields: &Map<String, Value>) -> Result<(), String> {
        for (name, spec) in &self.0 {
            match fields.get(name) {
                None if spec.is_required() => {
                    return Err(format!("missing required field '{}'", name));
                }
                None => {}
                Some(value) => {
                    let actual = ValueKind::of(value);
                    if actual.as_str() != spec.kind {
                        return Err(format!(
                            "field '{}' must be {}, found {}",
                            name, spec.kind, actual
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, FieldSpec)> for Schema {
    fn from_iter<T: IntoIterator<Item = (String, FieldSpec)>>(iter: T) -> Self {
        Schema(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> Schema {
        Schema::new()
            .field("name", "string", true)
            .field("age", "number", false)
    }

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_deserialize_optional_required() {
        let schema: Schema =
            serde_json::from_value(json!({"name": {"type": "string"}})).unwrap();
        let spec = schema.get("name").unwrap();
        assert!(!spec.is_required());
        // Absent `required` stays absent on the way back out.
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"name": {"type": "string"}})
        );
    }

    #[test]
    fn test_check_definition() {
        assert!(users().check_definition().is_ok());
        assert!(Schema::new().field("x", "date", false).check_definition().is_err());
        assert!(Schema::new().field("x", "null", false).check_definition().is_err());
    }

    #[test]
    fn test_check_record_required() {
        let err = users().check_record(&obj(json!({"age": 3}))).unwrap_err();
        assert!(err.contains("name"));
        assert!(users().check_record(&obj(json!({"name": "a"}))).is_ok());
    }

    #[test]
    fn test_check_record_kind() {
        let err = users()
            .check_record(&obj(json!({"name": "a", "age": "old"})))
            .unwrap_err();
        assert!(err.contains("age"));
        assert!(users()
            .check_record(&obj(json!({"name": "a", "extra": [1]})))
            .is_ok());
    }
}
