use indexmap::IndexMap;
use std::rc::Rc;

use super::builtins;
use super::environment::Environment;
use super::error::EvalError;
use crate::ast::{
    BlockStmt, Expr, FilterExpr, ForExpr, InfixOp, PrefixOp, Program, ReadExpr, RowSelector,
    SaveFormat, SaveStmt, Stmt,
};
use crate::format;
use crate::table::Table;
use crate::value::{Function, Value};

/// Owns the root environment and walks programs statement by statement. The
/// driver uses [`Interpreter::eval_statement`] so it can print every
/// statement's value; [`Interpreter::run`] evaluates a whole program and
/// yields the last statement's value.
pub struct Interpreter {
    env: Environment,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Evaluates one statement; `None` means the statement has no printable
    /// value (a `let` binding).
    pub fn eval_statement(&mut self, stmt: &Stmt) -> Result<Option<Value>, EvalError> {
        eval_statement(stmt, &self.env)
    }

    pub fn run(&mut self, program: &Program) -> Result<Option<Value>, EvalError> {
        eval_program(program, &self.env)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates a program. The value is the last statement's value; a `return`
/// at program scope is unwrapped, and the first error stops evaluation.
pub fn eval_program(program: &Program, env: &Environment) -> Result<Option<Value>, EvalError> {
    let mut result = None;
    for stmt in &program.statements {
        result = eval_statement(stmt, env)?;
        if let Some(Value::Return(value)) = &result {
            return Ok(Some((**value).clone()));
        }
    }
    Ok(result)
}

fn eval_statement(stmt: &Stmt, env: &Environment) -> Result<Option<Value>, EvalError> {
    match stmt {
        Stmt::Let { name, value } => {
            let value = eval_expression(value, env)?;
            env.set(name.as_ref(), value);
            Ok(None)
        }
        Stmt::Assign { name, value } => {
            let value = eval_expression(value, env)?;
            // re-assignment requires an existing binding somewhere in scope
            if !env.contains(name) {
                return Err(EvalError::IdentifierNotFound(name.to_string()));
            }
            env.set(name.as_ref(), value.clone());
            Ok(Some(value))
        }
        Stmt::Return(expr) => {
            let value = eval_expression(expr, env)?;
            Ok(Some(Value::Return(Box::new(value))))
        }
        Stmt::Load { filename } => Ok(Some(eval_load(filename, env)?)),
        Stmt::Read(read) => Ok(Some(eval_read(read, env)?)),
        Stmt::Save(save) => Ok(Some(eval_save(save, env)?)),
        Stmt::For(for_expr) => Ok(Some(eval_for(for_expr, env)?)),
        Stmt::Expr(expr) => Ok(Some(eval_expression(expr, env)?)),
    }
}

/// Evaluates a block to the value of its last statement. A `return` value
/// passes through unwrapped so it keeps bubbling to the nearest call or
/// program boundary.
fn eval_block(block: &BlockStmt, env: &Environment) -> Result<Value, EvalError> {
    let mut result = Value::Null;
    for stmt in &block.statements {
        match eval_statement(stmt, env)? {
            Some(value) => {
                if matches!(value, Value::Return(_)) {
                    return Ok(value);
                }
                result = value;
            }
            None => result = Value::Null,
        }
    }
    Ok(result)
}

fn eval_expression(expr: &Expr, env: &Environment) -> Result<Value, EvalError> {
    match expr {
        Expr::Integer(value) => Ok(Value::Integer(*value)),
        Expr::Str(value) => Ok(Value::Str(Rc::from(value.as_str()))),
        Expr::Boolean(value) => Ok(Value::Boolean(*value)),
        Expr::Ident(name) => eval_identifier(name, env),
        Expr::Prefix { operator, right } => {
            let right = eval_expression(right, env)?;
            eval_prefix(*operator, right)
        }
        Expr::Infix {
            left,
            operator,
            right,
        } => {
            let left = eval_expression(left, env)?;
            let right = eval_expression(right, env)?;
            eval_infix(*operator, left, right)
        }
        Expr::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env)?;
            if condition.is_truthy() {
                eval_block(consequence, env)
            } else if let Some(alternative) = alternative {
                eval_block(alternative, env)
            } else {
                Ok(Value::Null)
            }
        }
        Expr::Function { parameters, body } => Ok(Value::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: Rc::clone(body),
            env: env.clone(),
        }))),
        Expr::Call {
            function,
            arguments,
        } => {
            let function = eval_expression(function, env)?;
            let mut args = Vec::with_capacity(arguments.len());
            for argument in arguments {
                args.push(eval_expression(argument, env)?);
            }
            apply_function(&function, &args, env)
        }
        Expr::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for element in elements {
                values.push(eval_expression(element, env)?);
            }
            Ok(Value::from_array(values))
        }
        Expr::Index { left, index } => {
            let left = eval_expression(left, env)?;
            let index = eval_expression(index, env)?;
            eval_index(left, index)
        }
        Expr::IndexAssign { left, index, value } => eval_index_assign(left, index, value, env),
        Expr::Read(read) => eval_read(read, env),
        Expr::For(for_expr) => eval_for(for_expr, env),
    }
}

fn eval_identifier(name: &str, env: &Environment) -> Result<Value, EvalError> {
    if let Some(value) = env.get(name) {
        return Ok(value);
    }
    if let Some(builtin) = builtins::lookup(name) {
        return Ok(Value::Builtin(builtin));
    }
    Err(EvalError::IdentifierNotFound(name.to_string()))
}

fn eval_prefix(operator: PrefixOp, right: Value) -> Result<Value, EvalError> {
    match operator {
        PrefixOp::Bang => Ok(Value::Boolean(!right.is_truthy())),
        PrefixOp::Minus => match right {
            Value::Integer(value) => Ok(Value::Integer(value.wrapping_neg())),
            other => Err(EvalError::UnknownPrefixOperator {
                operator: "-",
                operand: other.type_name(),
            }),
        },
    }
}

fn eval_infix(operator: InfixOp, left: Value, right: Value) -> Result<Value, EvalError> {
    if let (Value::Integer(l), Value::Integer(r)) = (&left, &right) {
        return eval_integer_infix(operator, *l, *r);
    }
    match operator {
        InfixOp::Eq => Ok(Value::Boolean(left == right)),
        InfixOp::NotEq => Ok(Value::Boolean(left != right)),
        _ if left.type_name() != right.type_name() => Err(EvalError::TypeMismatch {
            left: left.type_name(),
            operator: operator.symbol(),
            right: right.type_name(),
        }),
        _ => match (&left, &right) {
            (Value::Str(l), Value::Str(r)) if operator == InfixOp::Plus => {
                Ok(Value::Str(Rc::from(format!("{}{}", l, r).as_str())))
            }
            _ => Err(EvalError::UnknownInfixOperator {
                left: left.type_name(),
                operator: operator.symbol(),
                right: right.type_name(),
            }),
        },
    }
}

/// Integer arithmetic wraps in 64 bits; comparisons yield booleans.
fn eval_integer_infix(operator: InfixOp, left: i64, right: i64) -> Result<Value, EvalError> {
    match operator {
        InfixOp::Plus => Ok(Value::Integer(left.wrapping_add(right))),
        InfixOp::Minus => Ok(Value::Integer(left.wrapping_sub(right))),
        InfixOp::Asterisk => Ok(Value::Integer(left.wrapping_mul(right))),
        InfixOp::Slash => {
            if right == 0 {
                Err(EvalError::DivisionByZero)
            } else {
                Ok(Value::Integer(left.wrapping_div(right)))
            }
        }
        InfixOp::Lt => Ok(Value::Boolean(left < right)),
        InfixOp::Gt => Ok(Value::Boolean(left > right)),
        InfixOp::Eq => Ok(Value::Boolean(left == right)),
        InfixOp::NotEq => Ok(Value::Boolean(left != right)),
    }
}

fn apply_function(function: &Value, args: &[Value], env: &Environment) -> Result<Value, EvalError> {
    match function {
        Value::Function(function) => {
            if args.len() != function.parameters.len() {
                return Err(EvalError::WrongArgumentCount {
                    got: args.len(),
                    want: function.parameters.len(),
                });
            }
            let extended = Environment::enclosed(&function.env);
            for (parameter, arg) in function.parameters.iter().zip(args) {
                extended.set(parameter.as_ref(), arg.clone());
            }
            let result = eval_block(&function.body, &extended)?;
            Ok(unwrap_return(result))
        }
        Value::Builtin(builtin) => (builtin.func)(env, args),
        other => Err(EvalError::NotAFunction(other.type_name())),
    }
}

fn unwrap_return(value: Value) -> Value {
    match value {
        Value::Return(inner) => *inner,
        other => other,
    }
}

/// Array indexing is permissive: out-of-range reads yield `null`.
fn eval_index(left: Value, index: Value) -> Result<Value, EvalError> {
    match (&left, &index) {
        (Value::Array(elements), Value::Integer(i)) => {
            let elements = elements.borrow();
            if *i < 0 || *i as usize >= elements.len() {
                Ok(Value::Null)
            } else {
                Ok(elements[*i as usize].clone())
            }
        }
        _ => Err(EvalError::IndexNotSupported(left.type_name())),
    }
}

/// `array[index] = value` mutates the element in place; unlike reads,
/// out-of-range writes are an error.
fn eval_index_assign(
    left: &Expr,
    index: &Expr,
    value: &Expr,
    env: &Environment,
) -> Result<Value, EvalError> {
    let array = eval_expression(left, env)?;
    let index = eval_expression(index, env)?;
    let value = eval_expression(value, env)?;

    let Value::Array(elements) = &array else {
        return Err(EvalError::invalid_operation(format!(
            "index assignment not supported for type: {}",
            array.type_name()
        )));
    };
    let Value::Integer(i) = index else {
        return Err(EvalError::type_error(format!(
            "array index must be INTEGER, got {}",
            index.type_name()
        )));
    };
    let mut elements = elements.borrow_mut();
    if i < 0 || i as usize >= elements.len() {
        return Err(EvalError::IndexOutOfBounds(i));
    }
    elements[i as usize] = value.clone();
    Ok(value)
}

/// Loads a CSV file, binds it as the active table under `csv` (and the path
/// under `filename`), and returns it.
fn eval_load(filename: &Expr, env: &Environment) -> Result<Value, EvalError> {
    let filename = match filename {
        Expr::Ident(name) => name.to_string(),
        Expr::Str(value) => value.clone(),
        other => other.to_string(),
    };
    env.set("filename", Value::Str(Rc::from(filename.as_str())));

    let content = std::fs::read_to_string(&filename)
        .map_err(|e| EvalError::io(format!("could not open file: {}", e)))?;
    let (headers, records) = format::parse_csv(&content).map_err(|e| {
        if e == "empty input" {
            EvalError::io("could not read CSV headers: EOF".to_string())
        } else {
            EvalError::io(format!("could not read CSV records: {}", e))
        }
    })?;
    let rows = format::records_to_rows(&headers, records);
    let value = Value::from_table(Table::new(headers, rows));
    env.set("csv", value.clone());
    Ok(value)
}

/// `read`: select rows from the active table, filter, then either project a
/// column to an array or return a narrowed table. The `csv` binding itself
/// is left untouched; the result is the expression's value.
fn eval_read(read: &ReadExpr, env: &Environment) -> Result<Value, EvalError> {
    let location = &read.location;
    if location.row == RowSelector::Invalid {
        return Err(EvalError::invalid_operation("invalid read location"));
    }

    let Some(active) = env.get("csv") else {
        return Err(EvalError::invalid_operation("no CSV data to read"));
    };
    let Value::Csv(table) = active else {
        return Err(EvalError::invalid_operation("cannot read from non-CSV data"));
    };

    let mut rows: Vec<IndexMap<String, String>> = match location.row {
        RowSelector::All => table.rows.clone(),
        RowSelector::Index(i) if i >= 0 && (i as usize) < table.rows.len() => {
            vec![table.rows[i as usize].clone()]
        }
        _ => Vec::new(),
    };

    if let Some(filter) = &location.filter {
        let compare = eval_expression(&filter.value, env)?;
        rows.retain(|row| row_matches(row, filter, &compare));
    }

    if !location.column.is_empty() {
        return Ok(extract_column(&rows, &location.column));
    }

    Ok(Value::from_table(Table {
        headers: table.headers.clone(),
        column_types: table.column_types.clone(),
        rows,
    }))
}

/// Applies a `where` clause to one row. Comparison follows the filter
/// value's runtime type; a cell that fails to parse fails the predicate.
fn row_matches(row: &IndexMap<String, String>, filter: &FilterExpr, compare: &Value) -> bool {
    let cell = row.get(&filter.column).map(String::as_str).unwrap_or("");
    let operator = filter.operator.as_str();
    match compare {
        Value::Integer(expected) => {
            let Ok(actual) = cell.parse::<i64>() else {
                return false;
            };
            match operator {
                ">" => actual > *expected,
                "<" => actual < *expected,
                ">=" => actual >= *expected,
                "<=" => actual <= *expected,
                "==" => actual == *expected,
                "!=" => actual != *expected,
                _ => false,
            }
        }
        Value::Str(expected) => {
            let expected = expected.as_ref();
            match operator {
                "==" => cell == expected,
                "!=" => cell != expected,
                ">" => cell > expected,
                "<" => cell < expected,
                ">=" => cell >= expected,
                "<=" => cell <= expected,
                _ => false,
            }
        }
        Value::Boolean(expected) => {
            let Some(actual) = parse_bool_cell(cell) else {
                return false;
            };
            match operator {
                "==" => actual == *expected,
                "!=" => actual != *expected,
                _ => false,
            }
        }
        _ => false,
    }
}

fn parse_bool_cell(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

/// Projection: the named column's cells as an array, each coerced to an
/// integer when it parses as one.
fn extract_column(rows: &[IndexMap<String, String>], column: &str) -> Value {
    let mut values = Vec::new();
    for row in rows {
        if let Some(cell) = row.get(column) {
            match cell.parse::<i64>() {
                Ok(value) => values.push(Value::Integer(value)),
                Err(_) => values.push(Value::Str(Rc::from(cell.as_str()))),
            }
        }
    }
    Value::from_array(values)
}

fn eval_save(save: &SaveStmt, env: &Environment) -> Result<Value, EvalError> {
    let table = match &save.source {
        Some(name) => {
            let value = eval_identifier(name, env)?;
            let Value::Csv(table) = value else {
                return Err(EvalError::invalid_operation("cannot save non-CSV data"));
            };
            table
        }
        None => {
            let Some(value) = env.get("csv") else {
                return Err(EvalError::invalid_operation("no CSV data to save"));
            };
            let Value::Csv(table) = value else {
                return Err(EvalError::invalid_operation("cannot save non-CSV data"));
            };
            table
        }
    };

    match save.format {
        SaveFormat::Csv => {
            let text = format::table_to_csv_string(&table);
            std::fs::write(&save.filename, text)
                .map_err(|e| EvalError::io(format!("could not create file: {}", e)))?;
        }
        SaveFormat::Json => {
            let document = format::table_to_json(&table);
            let text = serde_json::to_string_pretty(&document)
                .map_err(|e| EvalError::io(format!("error converting to JSON: {}", e)))?;
            std::fs::write(&save.filename, text)
                .map_err(|e| EvalError::io(format!("error writing file: {}", e)))?;
        }
    }
    Ok(Value::Null)
}

/// Iterates an array in index order. Each iteration gets a fresh frame with
/// the ordinal and element bound; afterwards the element binding is written
/// back into the array slot, and loop-frame bindings whose names exist in an
/// enclosing frame are copied back out ("last assigned value wins").
fn eval_for(for_expr: &ForExpr, env: &Environment) -> Result<Value, EvalError> {
    let iterable = eval_expression(&for_expr.iterable, env)?;
    let Value::Array(elements) = &iterable else {
        return Err(EvalError::type_error(format!(
            "for loop iterable must be ARRAY, got {}",
            iterable.type_name()
        )));
    };

    let length = elements.borrow().len();
    for i in 0..length {
        let element = elements.borrow()[i].clone();
        let loop_env = Environment::enclosed(env);
        loop_env.set(for_expr.index_name.as_ref(), Value::Integer(i as i64));
        loop_env.set(for_expr.element_name.as_ref(), element);

        // the body's value (including a `return`) is discarded; errors abort
        eval_block(&for_expr.body, &loop_env)?;

        if let Some(updated) = loop_env.get(for_expr.element_name.as_ref()) {
            elements.borrow_mut()[i] = updated;
        }
        for (name, value) in loop_env.local_bindings() {
            if env.contains(&name) {
                env.set(name, value);
            }
        }
    }
    Ok(Value::Null)
}
