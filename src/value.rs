use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::BlockStmt;
use crate::interpreter::environment::Environment;
use crate::interpreter::error::EvalError;
use crate::table::Table;

/// A runtime value. Atoms are cheap to clone; arrays share their backing
/// storage so index assignment and loop write-back are visible through every
/// handle, while tables are replaced whole on mutation.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Str(Rc<str>),
    Boolean(bool),
    /// Wraps the value of a `return` so it can travel up through nested
    /// blocks; unwrapped at call and program boundaries.
    Return(Box<Value>),
    Function(Rc<Function>),
    Builtin(&'static Builtin),
    Array(Rc<RefCell<Vec<Value>>>),
    Csv(Rc<Table>),
}

/// A user-defined function together with the environment visible at its
/// definition point (lexical scope; enables closures).
#[derive(Debug, Clone)]
pub struct Function {
    pub parameters: Vec<Rc<str>>,
    pub body: Rc<BlockStmt>,
    pub env: Environment,
}

pub type BuiltinFn = fn(&Environment, &[Value]) -> Result<Value, EvalError>;

/// A named built-in function. The table of these lives in
/// `interpreter::builtins`; identifiers resolve to it after the environment.
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INTEGER",
            Value::Str(_) => "STRING",
            Value::Boolean(_) => "BOOLEAN",
            Value::Return(_) => "RETURN_VALUE",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Array(_) => "ARRAY",
            Value::Csv(_) => "CSV",
        }
    }

    /// Everything is truthy except `null` and `false`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            _ => true,
        }
    }

    pub fn from_array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn from_table(table: Table) -> Value {
        Value::Csv(Rc::new(table))
    }
}

/// Equality follows the language's `==` semantics: integers, strings and
/// booleans compare by value; arrays, tables and functions compare by
/// identity of their shared storage; anything mixed is unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Return(a), Value::Return(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Csv(a), Value::Csv(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Str(value) => f.write_str(value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::Return(value) => write!(f, "{}", value),
            Value::Function(function) => {
                let params: Vec<&str> =
                    function.parameters.iter().map(|p| p.as_ref()).collect();
                write!(f, "fn({}) {{\n{}\n}}", params.join(", "), function.body)
            }
            Value::Builtin(_) => f.write_str("builtin function"),
            Value::Array(elements) => {
                let rendered: Vec<String> =
                    elements.borrow().iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
            Value::Csv(table) => f.write_str(&table.render()),
        }
    }
}
