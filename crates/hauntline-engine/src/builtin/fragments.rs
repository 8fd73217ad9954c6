//! Built-in Break stage: one text fragment per record.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakSummary {
    /// Fragment files written, counting overwrites.
    pub written: usize,
    /// Records whose file name repeated an earlier one.
    pub collisions: usize,
    pub skipped: usize,
}

/// Replace anything outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// File name for the record at `index`: its `id`, else its `name`, else its
/// `State` suffixed with the index, else `item_<index>`.
pub fn fragment_file_name(record: &Map<String, Value>, index: usize) -> String {
    let stem = if let Some(id) = record.get("id") {
        sanitize_file_stem(&value_text(id))
    } else if let Some(name) = record.get("name") {
        sanitize_file_stem(&value_text(name))
    } else if let Some(state) = record.get("State") {
        format!("{}_{index}", sanitize_file_stem(&value_text(state)))
    } else {
        format!("item_{index}")
    };
    format!("{stem}.txt")
}

/// Fragment body: one `key: value` line per field, in document order.
pub fn fragment_text(record: &Map<String, Value>) -> String {
    let mut text = String::new();
    for (key, value) in record {
        let _ = writeln!(text, "{key}: {}", value_text(value));
    }
    text
}

/// Find the record array in either `{ "<records_key>": [...] }` or `[...]`.
fn records_of<'a>(document: &'a Value, records_key: &str) -> Result<&'a Vec<Value>> {
    let items = match document {
        Value::Array(items) => items,
        Value::Object(map) => match map.get(records_key) {
            Some(Value::Array(items)) => items,
            Some(other) => bail!(
                "'{records_key}' must be an array, found {}",
                json_type(other)
            ),
            None => bail!("expected a list or an object with a '{records_key}' key"),
        },
        other => bail!(
            "expected a list or an object with a '{records_key}' key, found {}",
            json_type(other)
        ),
    };
    Ok(items)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Write one fragment file per record object into `fragments_dir`.
///
/// Non-object items are skipped with a warning. A record whose file name
/// collides with an earlier one overwrites it; the collision is logged.
///
/// # Errors
///
/// Fails if the records cannot be read or parsed, have an unexpected shape,
/// or a fragment cannot be written.
pub fn break_records(
    records_path: &Path,
    fragments_dir: &Path,
    records_key: &str,
) -> Result<BreakSummary> {
    let text = std::fs::read_to_string(records_path)
        .with_context(|| format!("Failed to read records: {}", records_path.display()))?;
    let document: Value = serde_json::from_str(&text)
        .with_context(|| format!("Invalid JSON in {}", records_path.display()))?;
    let items = records_of(&document, records_key)
        .with_context(|| format!("Unexpected JSON format in {}", records_path.display()))?;

    std::fs::create_dir_all(fragments_dir)
        .with_context(|| format!("Failed to create directory: {}", fragments_dir.display()))?;

    let mut seen = HashSet::new();
    let mut summary = BreakSummary {
        written: 0,
        collisions: 0,
        skipped: 0,
    };
    for (index, item) in items.iter().enumerate() {
        let Value::Object(record) = item else {
            tracing::warn!(index, "Skipping non-object record");
            summary.skipped += 1;
            continue;
        };
        let file_name = fragment_file_name(record, index);
        if !seen.insert(file_name.clone()) {
            tracing::warn!(index, file = %file_name, "Fragment name collides with an earlier record");
            summary.collisions += 1;
        }
        let path = fragments_dir.join(&file_name);
        std::fs::write(&path, fragment_text(record))
            .with_context(|| format!("Failed to write fragment: {}", path.display()))?;
        summary.written += 1;
    }

    tracing::info!(
        written = summary.written,
        files = seen.len(),
        collisions = summary.collisions,
        skipped = summary.skipped,
        output = %fragments_dir.display(),
        "Wrote record fragments"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Ada, Ohio"), "Ada__Ohio");
        assert_eq!(sanitize_file_stem("id-42_x"), "id-42_x");
        assert_eq!(sanitize_file_stem("café"), "caf_");
    }

    #[test]
    fn test_file_name_precedence() {
        let with_id = object(json!({"id": 7, "name": "n", "State": "Ohio"}));
        assert_eq!(fragment_file_name(&with_id, 3), "7.txt");
        let with_name = object(json!({"name": "Old Mill", "State": "Ohio"}));
        assert_eq!(fragment_file_name(&with_name, 3), "Old_Mill.txt");
        let with_state = object(json!({"State": "New York"}));
        assert_eq!(fragment_file_name(&with_state, 3), "New_York_3.txt");
        let bare = object(json!({"city": "Ada"}));
        assert_eq!(fragment_file_name(&bare, 3), "item_3.txt");
    }

    #[test]
    fn test_fragment_text_lines_in_order() {
        let record = object(json!({"State": "Ohio", "city": "Ada", "year": 1901}));
        assert_eq!(fragment_text(&record), "State: Ohio\ncity: Ada\nyear: 1901\n");
    }

    #[test]
    fn test_break_keyed_document() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("haunted_places.json");
        std::fs::write(
            &records,
            json!({"haunted_places": [
                {"State": "Ohio", "city": "Ada"},
                "not a record",
                {"State": "Texas", "city": "Austin"}
            ]})
            .to_string(),
        )
        .unwrap();
        let out = dir.path().join("haunted_places");

        let summary = break_records(&records, &out, "haunted_places").unwrap();
        assert_eq!(
            summary,
            BreakSummary {
                written: 2,
                collisions: 0,
                skipped: 1
            }
        );
        assert_eq!(
            std::fs::read_to_string(out.join("Ohio_0.txt")).unwrap(),
            "State: Ohio\ncity: Ada\n"
        );
        assert!(out.join("Texas_2.txt").is_file());
    }

    #[test]
    fn test_break_top_level_array() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("records.json");
        std::fs::write(&records, r#"[{"id": "a"}, {"id": "b"}]"#).unwrap();
        let out = dir.path().join("fragments");
        let summary = break_records(&records, &out, "haunted_places").unwrap();
        assert_eq!(summary.written, 2);
        assert!(out.join("a.txt").is_file());
    }

    #[test]
    fn test_break_counts_name_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("records.json");
        std::fs::write(
            &records,
            r#"[{"name": "Old Mill"}, {"name": "Old Mill", "State": "Ohio"}, {"name": "Bridge"}]"#,
        )
        .unwrap();
        let out = dir.path().join("fragments");

        let summary = break_records(&records, &out, "haunted_places").unwrap();
        assert_eq!(summary.written, 3);
        assert_eq!(summary.collisions, 1);
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 2);
        // The later record wins
        assert_eq!(
            std::fs::read_to_string(out.join("Old_Mill.txt")).unwrap(),
            "name: Old Mill\nState: Ohio\n"
        );
    }

    #[test]
    fn test_break_rejects_unexpected_shapes() {
        let dir = tempfile::tempdir().unwrap();
        let records = dir.path().join("records.json");
        let out = dir.path().join("fragments");

        std::fs::write(&records, r#"{"places": []}"#).unwrap();
        let err = format!("{:#}", break_records(&records, &out, "haunted_places").unwrap_err());
        assert!(err.contains("'haunted_places' key"), "got: {err}");

        std::fs::write(&records, r#"{"haunted_places": {"a": 1}}"#).unwrap();
        let err = format!("{:#}", break_records(&records, &out, "haunted_places").unwrap_err());
        assert!(err.contains("must be an array"), "got: {err}");

        std::fs::write(&records, "{not json").unwrap();
        let err = format!("{:#}", break_records(&records, &out, "haunted_places").unwrap_err());
        assert!(err.contains("Invalid JSON"), "got: {err}");
    }
}
