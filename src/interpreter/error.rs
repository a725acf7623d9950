use std::backtrace::Backtrace;
use std::fmt;

use crate::diagnostic::Diagnostic;

/// A recorded parse error. Parsing never aborts; errors accumulate with the
/// source position of the offending token and a captured call stack for
/// verbose diagnostics.
#[derive(Debug, Clone)]
pub struct ParserError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub stack: String,
}

impl ParserError {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line,
            column,
            stack: Backtrace::force_capture().to_string(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(&self.message, self.line, self.column)
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at line {}, column {}",
            self.message, self.line, self.column
        )
    }
}

impl std::error::Error for ParserError {}

/// A runtime error. These short-circuit the enclosing expression and block
/// and bubble to the program level, where the driver stops; the message
/// strings are stable and user-visible.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    TypeMismatch {
        left: &'static str,
        operator: &'static str,
        right: &'static str,
    },
    UnknownPrefixOperator {
        operator: &'static str,
        operand: &'static str,
    },
    UnknownInfixOperator {
        left: &'static str,
        operator: &'static str,
        right: &'static str,
    },
    IdentifierNotFound(String),
    NotAFunction(&'static str),
    WrongArgumentCount {
        got: usize,
        want: usize,
    },
    IndexNotSupported(&'static str),
    IndexOutOfBounds(i64),
    DivisionByZero,
    TypeError(String),
    InvalidOperation(String),
    Io(String),
}

impl EvalError {
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError(message.into())
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::TypeMismatch {
                left,
                operator,
                right,
            } => write!(f, "type mismatch: {} {} {}", left, operator, right),
            EvalError::UnknownPrefixOperator { operator, operand } => {
                write!(f, "unknown operator: {}{}", operator, operand)
            }
            EvalError::UnknownInfixOperator {
                left,
                operator,
                right,
            } => write!(f, "unknown operator: {} {} {}", left, operator, right),
            EvalError::IdentifierNotFound(name) => write!(f, "identifier not found: {}", name),
            EvalError::NotAFunction(type_name) => write!(f, "not a function: {}", type_name),
            EvalError::WrongArgumentCount { got, want } => {
                write!(f, "wrong number of arguments. got={}, want={}", got, want)
            }
            EvalError::IndexNotSupported(type_name) => {
                write!(f, "index operator not supported: {}", type_name)
            }
            EvalError::IndexOutOfBounds(index) => {
                write!(f, "array index out of bounds: {}", index)
            }
            EvalError::DivisionByZero => f.write_str("division by zero"),
            EvalError::TypeError(message)
            | EvalError::InvalidOperation(message)
            | EvalError::Io(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for EvalError {}
