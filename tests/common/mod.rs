#![allow(dead_code)]

use csvlang::interpreter::parse_and_run;
use csvlang::Value;
use std::path::{Path, PathBuf};

/// Runs a script and returns the last statement's value.
pub fn run(source: &str) -> Value {
    parse_and_run(source)
        .expect("script should evaluate")
        .unwrap_or(Value::Null)
}

/// Runs a script expected to fail and returns the error message.
pub fn run_err(source: &str) -> String {
    parse_and_run(source)
        .expect_err("script should fail")
        .to_string()
}

pub fn assert_integer(value: &Value, expected: i64) {
    match value {
        Value::Integer(actual) => assert_eq!(*actual, expected),
        other => panic!("expected INTEGER {}, got {:?}", expected, other),
    }
}

pub fn assert_boolean(value: &Value, expected: bool) {
    match value {
        Value::Boolean(actual) => assert_eq!(*actual, expected),
        other => panic!("expected BOOLEAN {}, got {:?}", expected, other),
    }
}

pub fn assert_string(value: &Value, expected: &str) {
    match value {
        Value::Str(actual) => assert_eq!(actual.as_ref(), expected),
        other => panic!("expected STRING {:?}, got {:?}", expected, other),
    }
}

pub fn assert_null(value: &Value) {
    assert!(matches!(value, Value::Null), "expected NULL, got {:?}", value);
}

/// A per-test scratch directory under the system temp dir.
pub fn scratch_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("csvlang_{}_{}", tag, std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write fixture file");
    path
}
