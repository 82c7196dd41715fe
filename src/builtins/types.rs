//! Type inspection: type, quote?

use crate::env::Environment;
use crate::error::{LispyError, ARITY_ONE};
use crate::lexer::TokenKind;
use crate::value::Value;
use std::rc::Rc;

/// The name of a value's kind as a string.
pub fn builtin_type(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error(name, ARITY_ONE, args.len()));
    }
    Ok(Value::string(args[0].type_name()))
}

/// True when the argument is a quote-kind symbol or named "quote".
/// The reference checks both, so a plain symbol spelled quote counts.
pub fn builtin_quote_q(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error(name, ARITY_ONE, args.len()));
    }
    let is_quote = match &args[0] {
        Value::Sym(s) => s.kind == TokenKind::Quote || s.name == "quote",
        _ => false,
    };
    Ok(Value::bool_sym(is_quote))
}

/// Register all type builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("type".to_string(), Value::native("type", builtin_type));
    env.define("quote?".to_string(), Value::native("quote?", builtin_quote_q));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{make_list, Symbol};

    fn env() -> Rc<Environment> {
        Environment::new()
    }

    fn type_of(value: Value) -> String {
        builtin_type(&env(), "type", &[value]).unwrap().to_string()
    }

    #[test]
    fn test_type_names() {
        assert_eq!(type_of(Value::Int(1)), "int");
        assert_eq!(type_of(Value::Float(1.5)), "float");
        assert_eq!(type_of(Value::symbol("x")), "symbol");
        assert_eq!(type_of(Value::string("x")), "symbol");
        assert_eq!(type_of(make_list(vec![Value::Int(1)])), "list");
        assert_eq!(type_of(Value::empty()), "list");
        assert_eq!(type_of(Value::Array(vec![])), "array");
    }

    #[test]
    fn test_quote_predicate() {
        let quote_kind = Value::Sym(Symbol::new(TokenKind::Quote, "quote"));
        let quote_name = Value::symbol("quote");
        assert!(builtin_quote_q(&env(), "quote?", &[quote_kind]).unwrap().is_truthy());
        assert!(builtin_quote_q(&env(), "quote?", &[quote_name]).unwrap().is_truthy());
        assert!(!builtin_quote_q(&env(), "quote?", &[Value::symbol("x")])
            .unwrap()
            .is_truthy());
        assert!(!builtin_quote_q(&env(), "quote?", &[Value::Int(1)])
            .unwrap()
            .is_truthy());
    }
}
