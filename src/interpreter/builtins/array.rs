use super::expect_arity;
use crate::interpreter::environment::Environment;
use crate::interpreter::error::EvalError;
use crate::table::{merge_tables, to_table, Table};
use crate::value::Value;

pub(crate) fn len(_env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 1);
    match &args[0] {
        Value::Array(elements) => Ok(Value::Integer(elements.borrow().len() as i64)),
        Value::Str(s) => Ok(Value::Integer(s.len() as i64)),
        other => Err(EvalError::type_error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        ))),
    }
}

pub(crate) fn first(_env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 1);
    let Value::Array(elements) = &args[0] else {
        return Err(EvalError::type_error(format!(
            "argument to `first` must be ARRAY, got {}",
            args[0].type_name()
        )));
    };
    Ok(elements.borrow().first().cloned().unwrap_or(Value::Null))
}

pub(crate) fn last(_env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 1);
    let Value::Array(elements) = &args[0] else {
        return Err(EvalError::type_error(format!(
            "argument to `last` must be ARRAY, got {}",
            args[0].type_name()
        )));
    };
    Ok(elements.borrow().last().cloned().unwrap_or(Value::Null))
}

/// Everything but the first element; `null` when the array is empty.
pub(crate) fn rest(_env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 1);
    let Value::Array(elements) = &args[0] else {
        return Err(EvalError::type_error(format!(
            "argument to `rest` must be ARRAY, got {}",
            args[0].type_name()
        )));
    };
    let elements = elements.borrow();
    if elements.is_empty() {
        return Ok(Value::Null);
    }
    Ok(Value::from_array(elements[1..].to_vec()))
}

/// Appends to an array or table, producing a new value. Mixing with a table
/// coerces the other argument through the table-coercion rules; rows pushed
/// onto a 2-D array must match the existing row arity.
pub(crate) fn push(env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 2);

    if let Value::Csv(target) = &args[0] {
        let addition = to_table(&args[1], env)?;
        return Ok(Value::from_table(merge_tables(target, &addition)?));
    }

    if let Value::Csv(source) = &args[1] {
        if !matches!(args[0], Value::Array(_)) {
            return Err(EvalError::invalid_operation(
                "first argument must be ARRAY or CSV when pushing CSV",
            ));
        }
        let target = to_table(&args[0], env)?;
        return Ok(Value::from_table(merge_tables(&target, source)?));
    }

    let Value::Array(elements) = &args[0] else {
        return Err(EvalError::invalid_operation("first argument must be ARRAY"));
    };
    let elements = elements.borrow();

    if elements.is_empty() {
        return Ok(Value::from_array(vec![args[1].clone()]));
    }

    if let Value::Array(first_row) = &elements[0] {
        // 2-D array: only whole rows of matching arity may be pushed
        let Value::Array(pushed) = &args[1] else {
            return Err(EvalError::invalid_operation(
                "cannot push non-array value to 2D array",
            ));
        };
        let row_length = first_row.borrow().len();
        let pushed_length = pushed.borrow().len();
        if pushed_length != row_length {
            return Err(EvalError::invalid_operation(format!(
                "cannot push array of length {} to 2D array with row length {}",
                pushed_length, row_length
            )));
        }
    }

    let mut new_elements = elements.clone();
    new_elements.push(args[1].clone());
    Ok(Value::from_array(new_elements))
}

/// Drops the last row of a table or element of an array, producing a new
/// value.
pub(crate) fn pop(_env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 1);

    if let Value::Csv(table) = &args[0] {
        if table.rows.is_empty() {
            return Err(EvalError::invalid_operation("cannot pop from empty CSV"));
        }
        return Ok(Value::from_table(Table {
            headers: table.headers.clone(),
            column_types: table.column_types.clone(),
            rows: table.rows[..table.rows.len() - 1].to_vec(),
        }));
    }

    let Value::Array(elements) = &args[0] else {
        return Err(EvalError::invalid_operation("argument must be ARRAY or CSV"));
    };
    let elements = elements.borrow();
    if elements.is_empty() {
        return Err(EvalError::invalid_operation("cannot pop from empty array"));
    }
    Ok(Value::from_array(elements[..elements.len() - 1].to_vec()))
}

pub(crate) fn sum(_env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 1);
    let Value::Array(elements) = &args[0] else {
        return Err(EvalError::type_error(format!(
            "argument must be ARRAY, got {}",
            args[0].type_name()
        )));
    };
    let mut total: i64 = 0;
    for element in elements.borrow().iter() {
        let Value::Integer(value) = element else {
            return Err(EvalError::type_error(format!(
                "array elements must be INTEGER, got {}",
                element.type_name()
            )));
        };
        total = total.wrapping_add(*value);
    }
    Ok(Value::Integer(total))
}

/// Integer average of an integer array.
pub(crate) fn avg(_env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 1);
    let Value::Array(elements) = &args[0] else {
        return Err(EvalError::type_error(format!(
            "argument must be ARRAY, got {}",
            args[0].type_name()
        )));
    };
    let elements = elements.borrow();
    if elements.is_empty() {
        return Err(EvalError::invalid_operation(
            "cannot calculate average of empty array",
        ));
    }
    let mut total: i64 = 0;
    for element in elements.iter() {
        let Value::Integer(value) = element else {
            return Err(EvalError::type_error(format!(
                "array elements must be numeric, got {}",
                element.type_name()
            )));
        };
        total = total.wrapping_add(*value);
    }
    Ok(Value::Integer(total / elements.len() as i64))
}

pub(crate) fn count(_env: &Environment, args: &[Value]) -> Result<Value, EvalError> {
    expect_arity!(args, 1);
    match &args[0] {
        Value::Array(elements) => Ok(Value::Integer(elements.borrow().len() as i64)),
        Value::Csv(table) => Ok(Value::Integer(table.rows.len() as i64)),
        other => Err(EvalError::type_error(format!(
            "argument must be ARRAY or CSV, got {}",
            other.type_name()
        ))),
    }
}
