//! Built-in Convert stage: tab-separated source table to a JSON record collection.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

/// Summary of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertSummary {
    pub columns: usize,
    pub records: usize,
}

/// Parse TSV text into one JSON object per data row, keyed by the header row.
///
/// Blank lines are ignored and trailing `\r` is stripped. Rows shorter than
/// the header are padded with empty strings.
///
/// # Errors
///
/// Fails on empty input, an empty header cell, duplicate headers, or a row
/// with more cells than the header.
pub fn tsv_to_records(text: &str) -> Result<(Vec<String>, Vec<Value>)> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        bail!("source table is empty (no header row)");
    };
    let headers: Vec<String> = header_line
        .split('\t')
        .map(|h| h.trim().to_string())
        .collect();
    for (i, header) in headers.iter().enumerate() {
        if header.is_empty() {
            bail!("header column {} is empty", i + 1);
        }
        if headers[..i].contains(header) {
            bail!("duplicate header '{header}'");
        }
    }

    let mut records = Vec::new();
    for (line_no, line) in lines {
        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() > headers.len() {
            bail!(
                "line {line_no}: {} cells but the header has {} columns",
                cells.len(),
                headers.len()
            );
        }
        let mut record = Map::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let value = cells.get(i).copied().unwrap_or_default();
            record.insert(header.clone(), Value::String(value.to_string()));
        }
        records.push(Value::Object(record));
    }

    Ok((headers, records))
}

/// Convert `source` into `{ "<records_key>": [...] }` written to `records`.
///
/// # Errors
///
/// Fails if the table cannot be read or parsed, or the output cannot be written.
pub fn convert(source: &Path, records_path: &Path, records_key: &str) -> Result<ConvertSummary> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("Failed to read source table: {}", source.display()))?;
    let (headers, records) = tsv_to_records(&text)
        .with_context(|| format!("Invalid source table: {}", source.display()))?;

    let summary = ConvertSummary {
        columns: headers.len(),
        records: records.len(),
    };

    let mut document = Map::new();
    document.insert(records_key.to_string(), Value::Array(records));

    if let Some(parent) = records_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&Value::Object(document))?;
    std::fs::write(records_path, json)
        .with_context(|| format!("Failed to write records: {}", records_path.display()))?;

    tracing::info!(
        columns = summary.columns,
        records = summary.records,
        output = %records_path.display(),
        "Converted source table"
    );
    Ok(summary)
}
