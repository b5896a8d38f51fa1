//! String → JSON parsing rules.
//!
//! Records, predicates and patches are JSON objects. They can be given as one
//! JSON object argument or as `field=value` tokens:
//!
//! ```text
//! insert users '{"name": "Alice", "age": 30}'
//! insert users name=Alice age=30
//! select users age=30
//! ```
//!
//! The value side of a `field=value` token is auto-detected:
//! 1. JSON structures (`{`, `[`, `"`) → parsed as JSON
//! 2. `null` → null
//! 3. `true` / `false` → boolean
//! 4. Integer pattern → integer
//! 5. Float pattern → float
//! 6. Everything else → string

use jsondoc_engine::{Map, Predicate, Schema, Value};

/// Auto-detect a JSON value from a user-supplied string.
pub fn parse_value(s: &str) -> Value {
    if s.starts_with('{') || s.starts_with('[') || s.starts_with('"') {
        if let Ok(json) = serde_json::from_str::<Value>(s) {
            return json;
        }
        // Unparseable JSON falls through to a plain string.
    }

    match s {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if is_integer(s) {
        if let Ok(i) = s.parse::<i64>() {
            return Value::from(i);
        }
    }

    if is_float(s) {
        if let Ok(f) = s.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }

    Value::String(s.to_string())
}

/// Parse a JSON object argument.
pub fn parse_object(s: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(s) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("Expected a JSON object, got: {}", other)),
        Err(e) => Err(format!("Invalid JSON: {}", e)),
    }
}

/// Parse object tokens: one JSON object, or any number of `field=value` pairs.
pub fn parse_fields(tokens: &[String]) -> Result<Map<String, Value>, String> {
    if let [single] = tokens {
        if single.trim_start().starts_with('{') {
            return parse_object(single);
        }
    }

    let mut map = Map::new();
    for token in tokens {
        let (field, value) = token
            .split_once('=')
            .ok_or_else(|| format!("Expected field=value, got: {}", token))?;
        if field.is_empty() {
            return Err(format!("Empty field name in: {}", token));
        }
        map.insert(field.to_string(), parse_value(value));
    }
    Ok(map)
}

/// Parse optional where tokens. No tokens means no predicate.
pub fn parse_where(tokens: &[String]) -> Result<Option<Predicate>, String> {
    if tokens.is_empty() {
        return Ok(None);
    }
    parse_fields(tokens).map(|map| Some(Predicate::from(map)))
}

/// Parse a schema argument: `{"field": {"type": "string", "required": true}}`.
pub fn parse_schema(s: &str) -> Result<Schema, String> {
    serde_json::from_str(s).map_err(|e| format!("Invalid schema: {}", e))
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_float(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    if body.is_empty() {
        return false;
    }
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            (!int.is_empty() || !frac.is_empty())
                && int.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => !mantissa.is_empty() && mantissa.bytes().all(|b| b.is_ascii_digit()),
    };
    let exponent_ok = exponent.map_or(true, |e| {
        let e = e.strip_prefix(['+', '-']).unwrap_or(e);
        !e.is_empty() && e.bytes().all(|b| b.is_ascii_digit())
    });
    mantissa_ok && exponent_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_value_detection() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("-7"), json!(-7));
        assert_eq!(parse_value("2.5"), json!(2.5));
        assert_eq!(parse_value("1e3"), json!(1000.0));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value("[1,2]"), json!([1, 2]));
        assert_eq!(parse_value("\"42\""), json!("42"));
        assert_eq!(parse_value("Alice"), json!("Alice"));
        assert_eq!(parse_value("{broken"), json!("{broken"));
        assert_eq!(parse_value("-"), json!("-"));
        assert_eq!(parse_value("1.2.3"), json!("1.2.3"));
    }

    #[test]
    fn test_parse_fields_json_object() {
        let map = parse_fields(&strings(&[r#"{"name": "Alice", "age": 30}"#])).unwrap();
        assert_eq!(Value::Object(map), json!({"name": "Alice", "age": 30}));
    }

    #[test]
    fn test_parse_fields_pairs() {
        let map = parse_fields(&strings(&["name=Alice", "age=30", "tags=[\"a\"]"])).unwrap();
        assert_eq!(Value::Object(map), json!({"name": "Alice", "age": 30, "tags": ["a"]}));
    }

    #[test]
    fn test_parse_fields_errors() {
        assert!(parse_fields(&strings(&["novalue"])).is_err());
        assert!(parse_fields(&strings(&["=1"])).is_err());
        assert!(parse_fields(&strings(&["{not json"])).is_err());
        assert!(parse_object("[1, 2]").is_err());
    }

    #[test]
    fn test_parse_where() {
        assert!(parse_where(&[]).unwrap().is_none());
        let p = parse_where(&strings(&["_id=2"])).unwrap().unwrap();
        assert_eq!(p, Predicate::by_id(2));
    }

    #[test]
    fn test_parse_schema() {
        let schema = parse_schema(r#"{"name": {"type": "string", "required": true}}"#).unwrap();
        assert!(schema.get("name").unwrap().is_required());
        assert!(parse_schema("[]").is_err());
    }
}
