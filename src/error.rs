// ABOUTME: Error types for lexing, parsing, and evaluation failures

use crate::value::Value;
use thiserror::Error;

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_AT_LEAST_TWO: &str = "at least 2";
pub const ARITY_ZERO_OR_ONE: &str = "0-1";
pub const ARITY_TWO_OR_THREE: &str = "2-3";

#[derive(Error, Debug, Clone)]
pub enum LispyError {
    #[error("lex error: {0}")]
    Lex(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("unbound symbol: {0}")]
    Unbound(String),

    /// Arity error with function name, expected count/range, and actual count
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    Arity {
        function: String,
        expected: String, // "2", "2-3", "at least 1"
        actual: usize,
    },

    /// Type mismatch with function name, expected type, and actual type
    #[error("{function}: expected {expected}, got {actual}")]
    Type {
        function: String,
        expected: String,
        actual: String,
    },

    #[error("{function}: division by zero")]
    DivideByZero { function: String },

    #[error("evaluation exceeded the step ceiling (runaway recursion?)")]
    Depth,
}

impl LispyError {
    /// Create an arity error with expected and actual counts
    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        LispyError::Arity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    /// Create a type mismatch error from the offending value
    pub fn type_error(function: &str, expected: &str, actual: &Value) -> Self {
        LispyError::Type {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }

    pub fn divide_by_zero(function: &str) -> Self {
        LispyError::DivideByZero {
            function: function.to_string(),
        }
    }
}
