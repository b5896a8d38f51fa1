//! Output → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): Redis-style replies (`OK`, `(integer) 2`,
//!   numbered lists) and a table for selected records
//! - **JSON** (`--json`): `serde_json::to_string_pretty`
//! - **Raw** (`--raw`): bare values, one compact JSON record per line

use jsondoc_engine::{Record, Value, ID_FIELD};
use serde_json::json;

use crate::state::{Output, SessionError};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format a successful output.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(output),
        OutputMode::Raw => format_raw(output),
        OutputMode::Human => format_human(output),
    }
}

/// Format an error.
pub fn format_error(err: &SessionError, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&json!({ "error": err.to_string() }))
            .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Raw => err.to_string(),
        OutputMode::Human => format!("(error) {}", err),
    }
}

// =========================================================================
// JSON mode
// =========================================================================

fn to_json(output: &Output) -> Value {
    match output {
        Output::Created(name) => json!({ "created": name }),
        Output::Connected(name) => json!({ "connected": name }),
        Output::Unit => json!({ "ok": true }),
        Output::Names(names) => json!(names),
        Output::Inserted(record) => record.clone().into_value(),
        Output::Records(records) => {
            Value::Array(records.iter().cloned().map(Record::into_value).collect())
        }
        Output::Deleted(n) => json!({ "deleted": n }),
        Output::Updated(n) => json!({ "updated": n }),
    }
}

fn format_json(output: &Output) -> String {
    serde_json::to_string_pretty(&to_json(output))
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

// =========================================================================
// Raw mode
// =========================================================================

fn format_raw(output: &Output) -> String {
    match output {
        Output::Created(_) | Output::Connected(_) | Output::Unit => String::new(),
        Output::Names(names) => names.join("\n"),
        Output::Inserted(record) => record.id().to_string(),
        Output::Records(records) => records
            .iter()
            .map(|r| serde_json::to_string(r.as_map()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n"),
        Output::Deleted(n) | Output::Updated(n) => n.to_string(),
    }
}

// =========================================================================
// Human mode
// =========================================================================

fn format_human(output: &Output) -> String {
    match output {
        Output::Created(name) => format!("OK (created and connected to \"{}\")", name),
        Output::Connected(name) => format!("OK (connected to \"{}\")", name),
        Output::Unit => "OK".to_string(),
        Output::Names(names) => format_string_list(names),
        Output::Inserted(record) => format!("({}) {}", ID_FIELD, record.id()),
        Output::Records(records) => format_table(records),
        Output::Deleted(n) | Output::Updated(n) => format!("(integer) {}", n),
    }
}

fn format_string_list(items: &[String]) -> String {
    if items.is_empty() {
        "(empty list)".to_string()
    } else {
        items
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}) \"{}\"", i + 1, s))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Cell text: strings bare, everything else as compact JSON.
fn cell(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Render records as a table. Columns are the union of field names in
/// first-seen order, so `_id` always leads.
fn format_table(records: &[Record]) -> String {
    if records.is_empty() {
        return "(empty list)".to_string();
    }

    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        for name in record.field_names() {
            if !columns.contains(&name) {
                columns.push(name);
            }
        }
    }

    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| columns.iter().map(|c| cell(r.get(c))).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            rows.iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(c.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
        }
        line
    };
    let mut out = vec![border.clone()];
    out.push(render_row(columns.iter().copied(), &widths));
    out.push(border.clone());
    for row in &rows {
        out.push(render_row(row.iter().map(String::as_str), &widths));
    }
    out.push(border);
    out.push(match records.len() {
        1 => "(1 record)".to_string(),
        n => format!("({} records)", n),
    });
    out.join("\n")
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (text, w) in cells.zip(widths) {
        let pad = w - text.chars().count();
        line.push(' ');
        line.push_str(text);
        line.push_str(&" ".repeat(pad + 1));
        line.push('|');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsondoc_engine::{Error, Map};

    fn record(id: u64, v: Value) -> Record {
        match v {
            Value::Object(m) => Record::new(id, m),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_format_unit() {
        assert_eq!(format_output(&Output::Unit, OutputMode::Human), "OK");
        assert_eq!(format_output(&Output::Unit, OutputMode::Raw), "");
    }

    #[test]
    fn test_format_counts() {
        assert_eq!(format_output(&Output::Deleted(2), OutputMode::Human), "(integer) 2");
        assert_eq!(format_output(&Output::Updated(0), OutputMode::Raw), "0");
        assert_eq!(
            format_output(&Output::Updated(1), OutputMode::Json),
            "{\n  \"updated\": 1\n}"
        );
    }

    #[test]
    fn test_format_names() {
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            format_output(&Output::Names(names.clone()), OutputMode::Human),
            "1) \"a\"\n2) \"b\""
        );
        assert_eq!(format_output(&Output::Names(names), OutputMode::Raw), "a\nb");
        assert_eq!(
            format_output(&Output::Names(vec![]), OutputMode::Human),
            "(empty list)"
        );
    }

    #[test]
    fn test_format_inserted() {
        let out = Output::Inserted(Record::new(4, Map::new()));
        assert_eq!(format_output(&out, OutputMode::Human), "(_id) 4");
        assert_eq!(format_output(&out, OutputMode::Raw), "4");
    }

    #[test]
    fn test_format_table_union_of_columns() {
        let records = vec![
            record(1, json!({"name": "Alice", "age": 30})),
            record(2, json!({"name": "Bob", "tags": ["x"]})),
        ];
        let expected = [
            "+-----+-------+-----+-------+",
            "| _id | name  | age | tags  |",
            "+-----+-------+-----+-------+",
            "| 1   | Alice | 30  |       |",
            "| 2   | Bob   |     | [\"x\"] |",
            "+-----+-------+-----+-------+",
            "(2 records)",
        ]
        .join("\n");
        assert_eq!(format_output(&Output::Records(records), OutputMode::Human), expected);
    }

    #[test]
    fn test_format_records_raw_and_json() {
        let records = vec![record(1, json!({"a": 1}))];
        assert_eq!(
            format_output(&Output::Records(records.clone()), OutputMode::Raw),
            r#"{"_id":1,"a":1}"#
        );
        let parsed: Value =
            serde_json::from_str(&format_output(&Output::Records(records), OutputMode::Json))
                .unwrap();
        assert_eq!(parsed, json!([{"_id": 1, "a": 1}]));
    }

    #[test]
    fn test_format_error() {
        let err = SessionError::from(Error::MissingPredicate);
        assert!(format_error(&err, OutputMode::Human).starts_with("(error) "));
        let parsed: Value = serde_json::from_str(&format_error(&err, OutputMode::Json)).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("where"));
        assert_eq!(
            format_error(&SessionError::NoDatabase, OutputMode::Raw),
            SessionError::NoDatabase.to_string()
        );
    }
}
