pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use environment::Environment;
pub use error::{EvalError, ParserError};
pub use evaluator::Interpreter;
pub use parser::Parser;

use crate::ast::Program;
use crate::lexer::Lexer;
use crate::value::Value;

/// Parses a script, returning the accumulated parse errors if there are any.
pub fn parse_program(source: &str) -> Result<Program, Vec<ParserError>> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}

/// Parses and evaluates a script in a fresh environment, yielding the last
/// statement's value. Parse errors fold into one runtime error; use
/// [`parse_program`] to inspect them individually.
pub fn parse_and_run(source: &str) -> Result<Option<Value>, EvalError> {
    let program = parse_program(source).map_err(|errors| {
        let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        EvalError::invalid_operation(format!("parse errors: {}", rendered.join("; ")))
    })?;
    let mut interpreter = Interpreter::new();
    interpreter.run(&program)
}
