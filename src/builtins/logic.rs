//! Logical operations: and, or, not
//!
//! Folds over the language truthiness rule: only `false` and the empty
//! list are falsy. Arguments arrive already evaluated, so there is no
//! short-circuiting.

use crate::env::Environment;
use crate::error::{LispyError, ARITY_AT_LEAST_TWO, ARITY_ONE};
use crate::value::Value;
use std::rc::Rc;

pub fn builtin_and(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() < 2 {
        return Err(LispyError::arity_error(name, ARITY_AT_LEAST_TWO, args.len()));
    }
    Ok(Value::bool_sym(args.iter().all(Value::is_truthy)))
}

pub fn builtin_or(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() < 2 {
        return Err(LispyError::arity_error(name, ARITY_AT_LEAST_TWO, args.len()));
    }
    Ok(Value::bool_sym(args.iter().any(Value::is_truthy)))
}

pub fn builtin_not(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error(name, ARITY_ONE, args.len()));
    }
    Ok(Value::bool_sym(!args[0].is_truthy()))
}

/// Register all logic builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("and".to_string(), Value::native("and", builtin_and));
    env.define("or".to_string(), Value::native("or", builtin_or));
    env.define("not".to_string(), Value::native("not", builtin_not));
}
