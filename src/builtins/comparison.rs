//! Comparison operations: =, <, >, <=, >=
//!
//! All comparators fold pairwise over adjacent arguments. `=` is
//! structural for pairs and arrays and by-name for symbols; the ordered
//! comparators accept numbers or two symbols (byte-wise name order).

use crate::env::Environment;
use crate::error::{LispyError, ARITY_AT_LEAST_TWO};
use crate::value::Value;
use std::cmp::Ordering;
use std::rc::Rc;

/// Structural equality. Int/float cross-compares numerically; symbols
/// compare by name regardless of kind; mismatched types are unequal
/// rather than an error.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => {
            (*x as f64) == *y
        }
        (Value::Sym(x), Value::Sym(y)) => x.name == y.name,
        (Value::Pair(None), Value::Pair(None)) => true,
        (Value::Pair(Some(x)), Value::Pair(Some(y))) => {
            values_equal(&x.head, &y.head) && values_equal(&x.tail, &y.tail)
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| values_equal(a, b))
        }
        (Value::Fn(x), Value::Fn(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

fn compare_ordered(name: &str, a: &Value, b: &Value) -> Result<bool, LispyError> {
    let ordering = match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Sym(x), Value::Sym(y)) => x.name.as_bytes().cmp(y.name.as_bytes()),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            let x = numeric(a);
            let y = numeric(b);
            match x.partial_cmp(&y) {
                Some(ordering) => ordering,
                None => return Ok(false), // NaN compares false
            }
        }
        _ => return Err(LispyError::type_error(name, "comparable values", b)),
    };
    Ok(match name {
        "<" => ordering == Ordering::Less,
        "<=" => ordering != Ordering::Greater,
        ">" => ordering == Ordering::Greater,
        ">=" => ordering != Ordering::Less,
        _ => false,
    })
}

fn numeric(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        _ => f64::NAN,
    }
}

pub fn builtin_eq(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() < 2 {
        return Err(LispyError::arity_error(name, ARITY_AT_LEAST_TWO, args.len()));
    }
    let equal = args.windows(2).all(|pair| values_equal(&pair[0], &pair[1]));
    Ok(Value::bool_sym(equal))
}

pub fn builtin_ordered(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() < 2 {
        return Err(LispyError::arity_error(name, ARITY_AT_LEAST_TWO, args.len()));
    }
    for pair in args.windows(2) {
        if !compare_ordered(name, &pair[0], &pair[1])? {
            return Ok(Value::bool_sym(false));
        }
    }
    Ok(Value::bool_sym(true))
}

/// Register all comparison builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("=".to_string(), Value::native("=", builtin_eq));
    for op in ["<", "<=", ">", ">="] {
        env.define(op.to_string(), Value::native(op, builtin_ordered));
    }
}
