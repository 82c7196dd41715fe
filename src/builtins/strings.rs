//! String and symbol operations: str, symbol, readstring

use crate::env::Environment;
use crate::error::{LispyError, ARITY_ONE};
use crate::value::Value;
use std::rc::Rc;

/// Concatenate the printed images of the arguments into a string symbol.
pub fn builtin_str(
    _env: &Rc<Environment>,
    _name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    let mut text = String::new();
    for arg in args {
        text.push_str(&arg.to_string());
    }
    Ok(Value::string(text))
}

/// Coerce any value's printed image to a plain symbol.
pub fn builtin_symbol(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error(name, ARITY_ONE, args.len()));
    }
    Ok(Value::symbol(args[0].to_string()))
}

/// Parse the first S-expression from a string and return it unevaluated.
pub fn builtin_readstring(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error(name, ARITY_ONE, args.len()));
    }
    let source = match &args[0] {
        Value::Sym(s) => s.name.as_str(),
        other => return Err(LispyError::type_error(name, "a string", other)),
    };
    let tokens = crate::lexer::tokenize(source)?;
    let mut forms = crate::parser::parse(&tokens)?;
    if forms.is_empty() {
        return Err(LispyError::Parse(format!("{}: empty input", name)));
    }
    Ok(forms.remove(0))
}

/// Register all string builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("str".to_string(), Value::native("str", builtin_str));
    env.define("symbol".to_string(), Value::native("symbol", builtin_symbol));
    env.define(
        "readstring".to_string(),
        Value::native("readstring", builtin_readstring),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    fn env() -> Rc<Environment> {
        Environment::new()
    }

    #[test]
    fn test_str_concatenates_images() {
        let result = builtin_str(
            &env(),
            "str",
            &[Value::string("var"), Value::Int(12), Value::symbol("x")],
        )
        .unwrap();
        match result {
            Value::Sym(s) => {
                assert_eq!(s.kind, TokenKind::String);
                assert_eq!(s.name, "var12x");
            }
            other => panic!("Expected string symbol, got {:?}", other),
        }
    }

    #[test]
    fn test_symbol_coercion() {
        let result = builtin_symbol(&env(), "symbol", &[Value::string("abc")]).unwrap();
        match result {
            Value::Sym(s) => {
                assert_eq!(s.kind, TokenKind::Symbol);
                assert_eq!(s.name, "abc");
            }
            other => panic!("Expected symbol, got {:?}", other),
        }
    }

    #[test]
    fn test_readstring_returns_unevaluated_form() {
        let result =
            builtin_readstring(&env(), "readstring", &[Value::string("(+ 1 2)")]).unwrap();
        assert_eq!(result.to_string(), "(+ 1 2)");
    }

    #[test]
    fn test_readstring_surfaces_parse_errors() {
        assert!(builtin_readstring(&env(), "readstring", &[Value::string("(1 2")]).is_err());
        assert!(builtin_readstring(&env(), "readstring", &[Value::string("")]).is_err());
    }
}
