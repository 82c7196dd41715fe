//! List operations: car, cdr, cons, list, quote, applyTo

use crate::env::Environment;
use crate::error::{LispyError, ARITY_ONE, ARITY_TWO};
use crate::lexer::TokenKind;
use crate::value::{list_elements, make_list, Value};
use std::rc::Rc;

/// Head of a list. A one-element list yields that element's value; an
/// atom passed directly is returned as-is (the trivial-wrapper rule the
/// prelude's hash-map accessors rely on).
pub fn builtin_car(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error(name, ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Pair(Some(cons)) => Ok(cons.head.clone()),
        Value::Pair(None) => Err(LispyError::type_error(name, "a non-empty list", &args[0])),
        atom => Ok(atom.clone()),
    }
}

/// Tail of a list; the tail of a one-element list is `()`.
pub fn builtin_cdr(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error(name, ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Pair(Some(cons)) => Ok(cons.tail.clone()),
        other => Err(LispyError::type_error(name, "a non-empty list", other)),
    }
}

/// Prepend: `(cons a lst)` makes a new pair. The tail is not required to
/// be a list, which is how improper pairs come to exist.
pub fn builtin_cons(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity_error(name, ARITY_TWO, args.len()));
    }
    Ok(Value::cons(args[0].clone(), args[1].clone()))
}

/// Build a list from the arguments.
pub fn builtin_list(
    _env: &Rc<Environment>,
    _name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    Ok(make_list(args.to_vec()))
}

/// Native shadow of the quote special form: identity on the (already
/// parsed) argument.
pub fn builtin_quote(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error(name, ARITY_ONE, args.len()));
    }
    Ok(args[0].clone())
}

/// `(applyTo f argList)`: invoke `f` with the elements of `argList` as
/// its arguments, without re-evaluating them.
pub fn builtin_apply_to(
    env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity_error(name, ARITY_TWO, args.len()));
    }
    let func = match &args[0] {
        Value::Fn(func) => func.clone(),
        Value::Sym(sym) if sym.kind == TokenKind::Symbol => {
            match crate::eval::resolve_symbol(sym, env)? {
                Value::Fn(func) => func,
                other => return Err(LispyError::type_error(name, "a function", &other)),
            }
        }
        other => return Err(LispyError::type_error(name, "a function", other)),
    };
    let call_args = list_elements(&args[1])
        .ok_or_else(|| LispyError::type_error(name, "an argument list", &args[1]))?;
    crate::eval::apply_function(&func, call_args, env)
}

/// Register all list builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("car".to_string(), Value::native("car", builtin_car));
    env.define("cdr".to_string(), Value::native("cdr", builtin_cdr));
    env.define("cons".to_string(), Value::native("cons", builtin_cons));
    env.define("list".to_string(), Value::native("list", builtin_list));
    env.define("quote".to_string(), Value::native("quote", builtin_quote));
    env.define(
        "applyTo".to_string(),
        Value::native("applyTo", builtin_apply_to),
    );
}
