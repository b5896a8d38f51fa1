//! Predicate matcher
//!
//! A [`Predicate`] is a conjunctive equality filter: it matches a record iff
//! every key is present in the record with a strictly equal value (see
//! [`strict_eq`]). A key missing from the record fails the match. The empty
//! predicate matches everything.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::{Record, ID_FIELD};
use crate::value::strict_eq;

/// Conjunctive equality filter over record fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate(Map<String, Value>);

impl Predicate {
    /// Create an empty predicate (matches every record)
    pub fn new() -> Self {
        Predicate(Map::new())
    }

    /// Predicate selecting one record identity
    pub fn by_id(id: u64) -> Self {
        Predicate::new().field(ID_FIELD, id)
    }

    /// Builder: add a `field == value` condition
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Interpret a JSON value as a predicate. Only objects are accepted.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Predicate(map)),
            _ => None,
        }
    }

    /// Number of conditions
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no conditions
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The conditions as a field map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Evaluate against a record
    pub fn matches(&self, record: &Record) -> bool {
        self.0.iter().all(|(field, expected)| {
            record
                .get(field)
                .is_some_and(|actual| strict_eq(actual, expected))
        })
    }

    /// Clone out the records this predicate matches, in order
    pub fn filter<'a, I>(&self, records: I) -> Vec<Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

impl From<Map<String, Value>> for Predicate {
    fn from(map: Map<String, Value>) -> Self {
        Predicate(map)
    }
}

/// Evaluate an optional predicate; `None` matches everything
pub fn matches_opt(predicate: Option<&Predicate>, record: &Record) -> bool {
    predicate.map_or(true, |p| p.matches(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(id: u64, v: Value) -> Record {
        match v {
            Value::Object(m) => Record::new(id, m),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_empty_matches_all() {
        let p = Predicate::new();
        assert!(p.is_empty());
        assert!(p.matches(&record(1, json!({}))));
        assert!(p.matches(&record(2, json!({"a": 1}))));
    }

    #[test]
    fn test_conjunction() {
        let p = Predicate::new().field("a", 1).field("b", "x");
        assert!(p.matches(&record(1, json!({"a": 1, "b": "x", "c": 0}))));
        assert!(!p.matches(&record(2, json!({"a": 1, "b": "y"}))));
        assert!(!p.matches(&record(3, json!({"a": 1}))));
    }

    #[test]
    fn test_missing_key_fails_even_for_null() {
        let p = Predicate::new().field("gone", Value::Null);
        assert!(!p.matches(&record(1, json!({"a": 1}))));
        assert!(p.matches(&record(2, json!({"gone": null}))));
    }

    #[test]
    fn test_no_coercion() {
        let p = Predicate::new().field("a", "1");
        assert!(!p.matches(&record(1, json!({"a": 1}))));
    }

    #[test]
    fn test_by_id() {
        let p = Predicate::by_id(2);
        assert!(!p.matches(&record(1, json!({}))));
        assert!(p.matches(&record(2, json!({}))));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Predicate::from_value(json!([1, 2])).is_none());
        assert!(Predicate::from_value(json!("a")).is_none());
        assert_eq!(Predicate::from_value(json!({"a": 1})).unwrap().len(), 1);
    }

    #[test]
    fn test_filter_keeps_order() {
        let records = vec![
            record(1, json!({"a": 1})),
            record(2, json!({"a": 2})),
            record(3, json!({"a": 1})),
        ];
        let got = Predicate::new().field("a", 1).filter(&records);
        let ids: Vec<u64> = got.iter().map(Record::id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_matches_opt_none_matches() {
        assert!(matches_opt(None, &record(1, json!({}))));
    }

    proptest! {
        #[test]
        fn prop_record_matches_its_own_fields(
            a in any::<i64>(),
            s in "[a-z]{0,8}",
            b in any::<bool>(),
        ) {
            let rec = record(1, json!({"a": a, "s": s, "b": b}));
            let p = Predicate::new().field("a", a).field("s", s.clone()).field("b", b);
            prop_assert!(p.matches(&rec));

            let miss = Predicate::new().field("s", format!("{}!", s));
            prop_assert!(!miss.matches(&rec));
        }
    }
}
