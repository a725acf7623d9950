use indexmap::IndexMap;

use super::expect_arity;
use crate::interpreter::environment::Environment;
use crate::interpreter::error::EvalError;
use crate::table::{to_table, Table};
use crate::value::Value;

/// Deduplicates the rows of a table, or of a 2-D array coerced into one.
/// The result is always a CSV value; row identity is the `|`-joined cell
/// key.
pub(crate) fn unique(env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 1);
    match &args[0] {
        Value::Csv(table) => Ok(Value::from_table(table.dedup_rows())),
        Value::Array(_) => {
            let table = to_table(&args[0], env)?;
            Ok(Value::from_table(table.dedup_rows()))
        }
        other => Err(EvalError::type_error(format!(
            "argument must be CSV or ARRAY, got {}",
            other.type_name()
        ))),
    }
}

/// `fill_empty(csv, column, value)`: replaces empty cells in the named
/// column with the given value (rendered to its cell string) and re-binds
/// the result as the active table.
pub(crate) fn fill_empty(env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 3);
    let Value::Csv(table) = &args[0] else {
        return Err(EvalError::type_error(format!(
            "argument must be CSV, got {}",
            args[0].type_name()
        )));
    };
    let field_name = args[1].to_string();
    let field_value = args[2].to_string();

    let rows: Vec<IndexMap<String, String>> = table
        .rows
        .iter()
        .map(|row| {
            table
                .headers
                .iter()
                .map(|header| {
                    let cell = row.get(header).map(String::as_str).unwrap_or("");
                    let filled = if *header == field_name && cell.is_empty() {
                        field_value.clone()
                    } else {
                        cell.to_string()
                    };
                    (header.clone(), filled)
                })
                .collect()
        })
        .collect();

    let modified = Value::from_table(Table {
        headers: table.headers.clone(),
        column_types: table.column_types.clone(),
        rows,
    });
    env.set("csv", modified.clone());
    Ok(modified)
}
