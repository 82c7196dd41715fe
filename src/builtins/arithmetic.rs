//! Arithmetic operations: +, -, *, /, %, # plus `rand` and `number`
//!
//! The operators are variadic left folds over one or more numeric
//! arguments; a single argument folds to itself. Int/int stays int
//! (`/` truncates), any float operand widens the result to float.

use crate::env::Environment;
use crate::error::{LispyError, ARITY_AT_LEAST_ONE, ARITY_ONE};
use crate::value::Value;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(f) => f,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Num::Int(n) => Value::Int(n),
            Num::Float(f) => Value::Float(f),
        }
    }
}

fn as_num(function: &str, value: &Value) -> Result<Num, LispyError> {
    match value {
        Value::Int(n) => Ok(Num::Int(*n)),
        Value::Float(f) => Ok(Num::Float(*f)),
        other => Err(LispyError::type_error(function, "a number", other)),
    }
}

fn combine_int(name: &str, a: i64, b: i64) -> Result<Num, LispyError> {
    match name {
        // widen to float on overflow rather than panicking
        "+" => Ok(a
            .checked_add(b)
            .map(Num::Int)
            .unwrap_or(Num::Float(a as f64 + b as f64))),
        "-" => Ok(a
            .checked_sub(b)
            .map(Num::Int)
            .unwrap_or(Num::Float(a as f64 - b as f64))),
        "*" => Ok(a
            .checked_mul(b)
            .map(Num::Int)
            .unwrap_or(Num::Float(a as f64 * b as f64))),
        "/" => {
            if b == 0 {
                Err(LispyError::divide_by_zero(name))
            } else {
                Ok(Num::Int(a / b))
            }
        }
        "%" => {
            if b == 0 {
                Err(LispyError::divide_by_zero(name))
            } else {
                Ok(Num::Int(a % b))
            }
        }
        "#" => {
            if (0..=u32::MAX as i64).contains(&b) {
                match a.checked_pow(b as u32) {
                    Some(n) => Ok(Num::Int(n)),
                    None => Ok(Num::Float((a as f64).powf(b as f64))),
                }
            } else {
                Ok(Num::Float((a as f64).powf(b as f64)))
            }
        }
        _ => Err(LispyError::type_error(
            name,
            "a numeric operator",
            &Value::symbol(name),
        )),
    }
}

fn combine_float(name: &str, a: f64, b: f64) -> Result<Num, LispyError> {
    match name {
        "+" => Ok(Num::Float(a + b)),
        "-" => Ok(Num::Float(a - b)),
        "*" => Ok(Num::Float(a * b)),
        "/" => {
            if b == 0.0 {
                Err(LispyError::divide_by_zero(name))
            } else {
                Ok(Num::Float(a / b))
            }
        }
        // remainder of the truncated operands, always an int
        "%" => {
            let divisor = b.trunc() as i64;
            if divisor == 0 {
                Err(LispyError::divide_by_zero(name))
            } else {
                Ok(Num::Int(a.trunc() as i64 % divisor))
            }
        }
        "#" => Ok(Num::Float(a.powf(b))),
        _ => Err(LispyError::type_error(
            name,
            "a numeric operator",
            &Value::symbol(name),
        )),
    }
}

fn fold_numeric(name: &str, args: &[Value]) -> Result<Value, LispyError> {
    if args.is_empty() {
        return Err(LispyError::arity_error(name, ARITY_AT_LEAST_ONE, 0));
    }
    let mut acc = as_num(name, &args[0])?;
    for arg in &args[1..] {
        let rhs = as_num(name, arg)?;
        acc = match (acc, rhs) {
            (Num::Int(a), Num::Int(b)) => combine_int(name, a, b)?,
            (a, b) => combine_float(name, a.as_f64(), b.as_f64())?,
        };
    }
    Ok(acc.into_value())
}

pub fn builtin_numeric(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    fold_numeric(name, args)
}

thread_local! {
    static RNG: RefCell<StdRng> = RefCell::new(seed_from_clock());
}

fn seed_from_clock() -> StdRng {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
        .unwrap_or(0);
    StdRng::seed_from_u64(seed)
}

/// New pseudo-random float in [0, 1).
pub fn builtin_rand(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if !args.is_empty() {
        return Err(LispyError::arity_error(name, "0", args.len()));
    }
    Ok(RNG.with(|rng| Value::Float(rng.borrow_mut().gen::<f64>())))
}

/// Coerce an int, float, or numeric string to a float.
pub fn builtin_number(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error(name, ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Int(n) => Ok(Value::Float(*n as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Sym(s) => s
            .name
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| LispyError::type_error(name, "a numeric string", &args[0])),
        other => Err(LispyError::type_error(name, "a number", other)),
    }
}

/// Register all arithmetic builtins in the environment
pub fn register(env: &Rc<Environment>) {
    for op in ["+", "-", "*", "/", "%", "#"] {
        env.define(op.to_string(), Value::native(op, builtin_numeric));
    }
    env.define("rand".to_string(), Value::native("rand", builtin_rand));
    env.define("number".to_string(), Value::native("number", builtin_number));
}
