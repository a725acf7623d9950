use indexmap::{IndexMap, IndexSet};
use std::fmt;
use std::rc::Rc;

use crate::interpreter::environment::Environment;
use crate::interpreter::error::EvalError;
use crate::value::Value;

/// Scalar kind of a table column, inferred rather than declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Str,
    Boolean,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Integer => f.write_str("INTEGER"),
            ColumnKind::Str => f.write_str("STRING"),
            ColumnKind::Boolean => f.write_str("BOOLEAN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnType {
    pub name: String,
    pub kind: ColumnKind,
}

/// An in-memory CSV table: ordered headers, per-column kinds, and rows as
/// ordered header→cell maps. Every row's key set equals `headers`; cells are
/// kept in their source string representation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub column_types: Vec<ColumnType>,
    pub rows: Vec<IndexMap<String, String>>,
}

impl Table {
    /// Builds a table and infers its column kinds from the first data row.
    pub fn new(headers: Vec<String>, rows: Vec<IndexMap<String, String>>) -> Self {
        let mut table = Table {
            headers,
            column_types: Vec::new(),
            rows,
        };
        table.infer_column_types();
        table
    }

    /// Infers column kinds from the first data row: `INTEGER` when the cell
    /// parses as a decimal integer, `STRING` otherwise. Leaves the kinds
    /// empty when the table has no rows.
    pub fn infer_column_types(&mut self) {
        let Some(first_row) = self.rows.first() else {
            return;
        };
        self.column_types = self
            .headers
            .iter()
            .map(|header| {
                let cell = first_row.get(header).map(String::as_str).unwrap_or("");
                let kind = if cell.parse::<i64>().is_ok() {
                    ColumnKind::Integer
                } else {
                    ColumnKind::Str
                };
                ColumnType {
                    name: header.clone(),
                    kind,
                }
            })
            .collect();
    }

    /// Identity of a row for deduplication: its cells joined in header order.
    pub fn row_key(&self, row: &IndexMap<String, String>) -> String {
        let cells: Vec<&str> = self
            .headers
            .iter()
            .map(|header| row.get(header).map(String::as_str).unwrap_or(""))
            .collect();
        cells.join("|")
    }

    /// Drops duplicate rows, keeping first occurrences in order.
    pub fn dedup_rows(&self) -> Table {
        let mut seen: IndexSet<String> = IndexSet::new();
        let mut unique_rows = Vec::new();
        for row in &self.rows {
            if seen.insert(self.row_key(row)) {
                unique_rows.push(row.clone());
            }
        }
        Table {
            headers: self.headers.clone(),
            column_types: self.column_types.clone(),
            rows: unique_rows,
        }
    }

    /// Renders the table as aligned text columns under a dashed header rule.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (i, header) in self.headers.iter().enumerate() {
                if let Some(cell) = row.get(header) {
                    widths[i] = widths[i].max(cell.len());
                }
            }
        }

        let mut out = String::new();
        for (header, width) in self.headers.iter().zip(widths.iter().copied()) {
            out.push_str(&format!("{:<width$} ", header, width = width));
        }
        out.push('\n');
        for width in widths.iter().copied() {
            out.push_str(&"-".repeat(width));
            out.push(' ');
        }
        out.push('\n');
        for row in &self.rows {
            for (header, width) in self.headers.iter().zip(widths.iter().copied()) {
                let cell = row.get(header).map(String::as_str).unwrap_or("");
                out.push_str(&format!("{:<width$} ", cell, width = width));
            }
            out.push('\n');
        }
        out
    }
}

/// `STRING` columns absorb any source kind; everything else must match.
pub fn compatible_kinds(target: ColumnKind, source: ColumnKind) -> bool {
    target == ColumnKind::Str || target == source
}

/// Appends `source`'s rows to `target` after checking column count and kind
/// compatibility.
pub fn merge_tables(target: &Table, source: &Table) -> Result<Table, EvalError> {
    if source.headers.len() != target.headers.len() {
        return Err(EvalError::invalid_operation(format!(
            "column count mismatch: expected {}, got {}",
            target.headers.len(),
            source.headers.len()
        )));
    }
    for (i, target_type) in target.column_types.iter().enumerate() {
        if let Some(source_type) = source.column_types.get(i) {
            if !compatible_kinds(target_type.kind, source_type.kind) {
                return Err(EvalError::invalid_operation(format!(
                    "incompatible column types for column {}",
                    target.headers[i]
                )));
            }
        }
    }

    let mut rows = target.rows.clone();
    // source rows are re-keyed to the target's headers positionally
    for row in &source.rows {
        let rekeyed: IndexMap<String, String> = target
            .headers
            .iter()
            .zip(row.values())
            .map(|(header, cell)| (header.clone(), cell.clone()))
            .collect();
        rows.push(rekeyed);
    }
    Ok(Table {
        headers: target.headers.clone(),
        column_types: target.column_types.clone(),
        rows,
    })
}

fn active_table(env: &Environment) -> Option<Rc<Table>> {
    match env.get("csv") {
        Some(Value::Csv(table)) => Some(table),
        _ => None,
    }
}

fn kind_of(value: &Value) -> ColumnKind {
    match value {
        Value::Integer(_) => ColumnKind::Integer,
        Value::Boolean(_) => ColumnKind::Boolean,
        _ => ColumnKind::Str,
    }
}

/// Reinterprets a value as a table. Scalars become a single cell, 1-D arrays
/// a single row, 2-D arrays one row per sub-array. When a table is active
/// under `csv`, its headers and kinds steer the interpretation; otherwise
/// headers are synthesised as `col1, col2, …` and kinds inferred from the
/// values.
pub fn to_table(value: &Value, env: &Environment) -> Result<Table, EvalError> {
    match value {
        Value::Csv(table) => Ok((**table).clone()),
        Value::Array(elements) => {
            let elements = elements.borrow();
            if elements.is_empty() {
                return Ok(Table::default());
            }
            if matches!(elements[0], Value::Array(_)) {
                let mut rows = Vec::with_capacity(elements.len());
                for element in elements.iter() {
                    let Value::Array(cells) = element else {
                        return Err(EvalError::invalid_operation(
                            "cannot mix rows and scalars in a 2-D array",
                        ));
                    };
                    rows.push(cells.borrow().clone());
                }
                rows_to_table(&rows, env)
            } else {
                let row: Vec<Value> = elements.clone();
                rows_to_table(&[row], env)
            }
        }
        Value::Integer(_) | Value::Str(_) | Value::Boolean(_) => {
            rows_to_table(&[vec![value.clone()]], env)
        }
        other => Err(EvalError::type_error(format!(
            "cannot convert {} to CSV",
            other.type_name()
        ))),
    }
}

fn rows_to_table(rows: &[Vec<Value>], env: &Environment) -> Result<Table, EvalError> {
    let width = rows[0].len();
    if rows.iter().any(|row| row.len() != width) {
        return Err(EvalError::invalid_operation(
            "rows of a 2-D array must have the same length",
        ));
    }

    let (headers, column_types) = match active_table(env) {
        Some(active) => {
            if active.headers.len() != width {
                return Err(EvalError::invalid_operation(format!(
                    "column count mismatch: expected {}, got {}",
                    active.headers.len(),
                    width
                )));
            }
            for (i, column_type) in active.column_types.iter().enumerate() {
                if !compatible_kinds(column_type.kind, kind_of(&rows[0][i])) {
                    return Err(EvalError::invalid_operation(format!(
                        "incompatible column types for column {}",
                        active.headers[i]
                    )));
                }
            }
            (active.headers.clone(), active.column_types.clone())
        }
        None => {
            let headers: Vec<String> = (1..=width).map(|i| format!("col{}", i)).collect();
            let column_types = headers
                .iter()
                .zip(&rows[0])
                .map(|(name, value)| ColumnType {
                    name: name.clone(),
                    kind: kind_of(value),
                })
                .collect();
            (headers, column_types)
        }
    };

    let table_rows = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .zip(row)
                .map(|(header, value)| (header.clone(), value.to_string()))
                .collect()
        })
        .collect();

    Ok(Table {
        headers,
        column_types,
        rows: table_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let headers = vec!["name".to_string(), "age".to_string()];
        let rows = vec![
            IndexMap::from([
                ("name".to_string(), "Alice".to_string()),
                ("age".to_string(), "30".to_string()),
            ]),
            IndexMap::from([
                ("name".to_string(), "Bob".to_string()),
                ("age".to_string(), "25".to_string()),
            ]),
        ];
        Table::new(headers, rows)
    }

    #[test]
    fn test_column_kind_inference() {
        let table = sample_table();
        assert_eq!(table.column_types.len(), 2);
        assert_eq!(table.column_types[0].kind, ColumnKind::Str);
        assert_eq!(table.column_types[1].kind, ColumnKind::Integer);
    }

    #[test]
    fn test_row_key_joins_cells_in_header_order() {
        let table = sample_table();
        assert_eq!(table.row_key(&table.rows[0]), "Alice|30");
    }

    #[test]
    fn test_dedup_rows() {
        let mut table = sample_table();
        table.rows.push(table.rows[0].clone());
        assert_eq!(table.rows.len(), 3);
        let unique = table.dedup_rows();
        assert_eq!(unique.rows.len(), 2);
        assert_eq!(unique.rows[0]["name"], "Alice");
        assert_eq!(unique.rows[1]["name"], "Bob");
    }

    #[test]
    fn test_render_aligns_columns() {
        let rendered = sample_table().render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "name  age ");
        assert_eq!(lines[1], "----- --- ");
        assert_eq!(lines[2], "Alice 30  ");
    }

    #[test]
    fn test_to_table_without_active_csv_synthesises_headers() {
        let env = Environment::new();
        let row = Value::from_array(vec![
            Value::Str(Rc::from("Alice")),
            Value::Integer(30),
        ]);
        let table = to_table(&row, &env).unwrap();
        assert_eq!(table.headers, vec!["col1", "col2"]);
        assert_eq!(table.column_types[1].kind, ColumnKind::Integer);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["col2"], "30");
    }

    #[test]
    fn test_to_table_uses_active_headers() {
        let env = Environment::new();
        env.set("csv", Value::from_table(sample_table()));
        let row = Value::from_array(vec![
            Value::Str(Rc::from("Carol")),
            Value::Integer(40),
        ]);
        let table = to_table(&row, &env).unwrap();
        assert_eq!(table.headers, vec!["name", "age"]);
        assert_eq!(table.rows[0]["name"], "Carol");
    }

    #[test]
    fn test_to_table_rejects_width_mismatch() {
        let env = Environment::new();
        env.set("csv", Value::from_table(sample_table()));
        let row = Value::from_array(vec![Value::Integer(1)]);
        let err = to_table(&row, &env).unwrap_err();
        assert_eq!(err.to_string(), "column count mismatch: expected 2, got 1");
    }

    #[test]
    fn test_merge_tables_checks_kinds() {
        let table = sample_table();
        let mut boolean_age = sample_table();
        boolean_age.column_types[1].kind = ColumnKind::Boolean;
        // age is INTEGER in the target; a BOOLEAN source column must be refused
        let err = merge_tables(&table, &boolean_age).unwrap_err();
        assert_eq!(err.to_string(), "incompatible column types for column age");
        // a STRING target column absorbs any source kind
        let mut string_age = sample_table();
        string_age.column_types[1].kind = ColumnKind::Str;
        assert!(merge_tables(&string_age, &boolean_age).is_ok());
    }

    #[test]
    fn test_merge_tables_appends_rows() {
        let table = sample_table();
        let merged = merge_tables(&table, &table).unwrap();
        assert_eq!(merged.rows.len(), 4);
        assert_eq!(merged.rows[2]["name"], "Alice");
    }
}
