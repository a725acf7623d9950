//! Physical CSV decoding/encoding and the JSON export document. The
//! evaluator treats this module as its row-reader/row-writer service and
//! wraps the error strings it returns into runtime errors.

use indexmap::IndexMap;
use serde_json::json;

use crate::table::Table;

/// Parses CSV text into a header row and data records. Blank lines are
/// skipped; every record must have as many fields as the header.
pub fn parse_csv(content: &str) -> Result<(Vec<String>, Vec<Vec<String>>), String> {
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Err("empty input".to_string());
    };
    let headers = split_csv_line(header_line);

    let mut records = Vec::new();
    for (index, line) in lines {
        let record = split_csv_line(line);
        if record.len() != headers.len() {
            return Err(format!(
                "record on line {}: wrong number of fields, expected {}, got {}",
                index + 1,
                headers.len(),
                record.len()
            ));
        }
        records.push(record);
    }
    Ok((headers, records))
}

/// Splits one CSV line on commas, honouring double-quoted fields; `""`
/// inside a quoted field is an escaped quote.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Encodes a table as CSV text: header row, then data rows in header order.
pub fn table_to_csv_string(table: &Table) -> String {
    let mut out = String::new();
    let headers: Vec<String> = table.headers.iter().map(|h| escape_csv_field(h)).collect();
    out.push_str(&headers.join(","));
    out.push('\n');
    for row in &table.rows {
        let cells: Vec<String> = table
            .headers
            .iter()
            .map(|header| escape_csv_field(row.get(header).map(String::as_str).unwrap_or("")))
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Builds the JSON export document:
/// `{ "headers": [...], "rows": [{header: cell, …}, …] }`. Cell values stay
/// strings (the source representation); row keys keep header order.
pub fn table_to_json(table: &Table) -> serde_json::Value {
    let rows: Vec<serde_json::Value> = table
        .rows
        .iter()
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = table
                .headers
                .iter()
                .map(|header| {
                    let cell = row.get(header).cloned().unwrap_or_default();
                    (header.clone(), serde_json::Value::String(cell))
                })
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();
    json!({
        "headers": table.headers,
        "rows": rows,
    })
}

/// Converts parsed CSV records into header→cell row maps.
pub fn records_to_rows(
    headers: &[String],
    records: Vec<Vec<String>>,
) -> Vec<IndexMap<String, String>> {
    records
        .into_iter()
        .map(|record| {
            headers
                .iter()
                .cloned()
                .zip(record)
                .collect::<IndexMap<String, String>>()
        })
        .collect()
}
