// ABOUTME: Value types representing Lispy data and code (the language is homoiconic)

use crate::env::Environment;
use crate::error::LispyError;
use crate::lexer::TokenKind;
use std::fmt;
use std::rc::Rc;

/// Signature shared by all built-in intrinsics.
pub type NativeFn = fn(&Rc<Environment>, &str, &[Value]) -> Result<Value, LispyError>;

/// An interned name plus the token kind it was lexed with. Symbols compare
/// by name; the kind is only consulted for evaluator dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: TokenKind,
    pub name: String,
}

impl Symbol {
    pub fn new(kind: TokenKind, name: impl Into<String>) -> Self {
        Symbol {
            kind,
            name: name.into(),
        }
    }
}

/// A cons cell. Cells are never mutated after construction, so sharing
/// through `Rc` is safe and keeps clones cheap.
#[derive(Debug)]
pub struct Cons {
    pub head: Value,
    pub tail: Value,
}

/// A function value: either a user closure (body + captured environment)
/// or a native intrinsic. `env` stays `None` on parse-time literals and is
/// filled in when the literal is evaluated.
pub struct Function {
    pub name: String,
    pub params: Vec<Symbol>,
    pub body: Option<Value>,
    pub is_macro: bool,
    pub native: Option<NativeFn>,
    pub env: Option<Rc<Environment>>,
}

impl Function {
    /// Copy of this function closed over `env`.
    pub fn with_env(&self, env: Rc<Environment>) -> Function {
        Function {
            name: self.name.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
            is_macro: self.is_macro,
            native: self.native,
            env: Some(env),
        }
    }
}

// Manual impl: the captured environment can reach this function again
// through its own bindings, so Debug must not descend into it.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("is_macro", &self.is_macro)
            .field("native", &self.native.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f64),
    Sym(Symbol),
    /// A cons cell; `None` is the empty list `()`.
    Pair(Option<Rc<Cons>>),
    Array(Vec<Value>),
    Fn(Rc<Function>),
    /// Deferred tail call. Exists only between a tail-position return and
    /// the trampoline that unwraps it; user code never observes one.
    Thunk(Rc<Function>, Rc<Environment>),
}

impl Value {
    pub fn empty() -> Value {
        Value::Pair(None)
    }

    pub fn cons(head: Value, tail: Value) -> Value {
        Value::Pair(Some(Rc::new(Cons { head, tail })))
    }

    pub fn symbol(name: impl Into<String>) -> Value {
        Value::Sym(Symbol::new(TokenKind::Symbol, name))
    }

    pub fn string(text: impl Into<String>) -> Value {
        Value::Sym(Symbol::new(TokenKind::String, text))
    }

    pub fn bool_sym(b: bool) -> Value {
        if b {
            Value::Sym(Symbol::new(TokenKind::True, "true"))
        } else {
            Value::Sym(Symbol::new(TokenKind::False, "false"))
        }
    }

    pub fn native(name: &str, f: NativeFn) -> Value {
        Value::Fn(Rc::new(Function {
            name: name.to_string(),
            params: Vec::new(),
            body: None,
            is_macro: false,
            native: Some(f),
            env: None,
        }))
    }

    pub fn is_empty_list(&self) -> bool {
        matches!(self, Value::Pair(None))
    }

    /// Only `false` and the empty list are falsy; everything else,
    /// including 0, the empty string, and the empty array, is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(
            self,
            Value::Pair(None)
                | Value::Sym(Symbol {
                    kind: TokenKind::False,
                    ..
                })
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Sym(_) => "symbol",
            Value::Pair(_) => "list",
            Value::Array(_) => "array",
            Value::Fn(_) | Value::Thunk(..) => "function",
        }
    }
}

/// Build a proper list from the given items, right-folded into pairs.
pub fn make_list(items: Vec<Value>) -> Value {
    items
        .into_iter()
        .rev()
        .fold(Value::empty(), |tail, head| Value::cons(head, tail))
}

/// Collect the elements of a list. Returns `None` when `value` is not a
/// pair at all; an improper tail is appended as a final element.
pub fn list_elements(value: &Value) -> Option<Vec<Value>> {
    let mut cell = match value {
        Value::Pair(cell) => cell.clone(),
        _ => return None,
    };
    let mut items = Vec::new();
    while let Some(cons) = cell {
        items.push(cons.head.clone());
        match &cons.tail {
            Value::Pair(next) => cell = next.clone(),
            atom => {
                items.push(atom.clone());
                break;
            }
        }
    }
    Some(items)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => {
                // keep integral floats distinguishable from ints
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{:.1}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Sym(s) => write!(f, "{}", s.name),
            Value::Pair(None) => write!(f, "()"),
            Value::Pair(Some(_)) => {
                let items = list_elements(self).unwrap_or_default();
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Fn(func) => {
                if func.native.is_some() {
                    write!(f, "#built-in")
                } else {
                    write!(f, "Define ({}) on ([", func.name)?;
                    for (i, param) in func.params.iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{}", param.name)?;
                    }
                    write!(f, "])")
                }
            }
            Value::Thunk(..) => write!(f, "#thunk"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_display() {
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Int(-7).to_string(), "-7");
    }

    #[test]
    fn test_float_display() {
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(-0.25).to_string(), "-0.25");
    }

    #[test]
    fn test_symbol_and_string_display() {
        assert_eq!(Value::symbol("foo").to_string(), "foo");
        // string symbols print their text without quotes
        assert_eq!(Value::string("hello").to_string(), "hello");
    }

    #[test]
    fn test_list_display() {
        let list = make_list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(list.to_string(), "(1 2 3)");
        assert_eq!(Value::empty().to_string(), "()");

        let nested = make_list(vec![
            Value::Int(1),
            make_list(vec![Value::Int(2), Value::Int(3)]),
        ]);
        assert_eq!(nested.to_string(), "(1 (2 3))");
    }

    #[test]
    fn test_improper_pair_display() {
        let pair = Value::cons(Value::string("k"), Value::string("v"));
        assert_eq!(pair.to_string(), "(k v)");
    }

    #[test]
    fn test_array_display() {
        let arr = Value::Array(vec![Value::Int(1), Value::symbol("x")]);
        assert_eq!(arr.to_string(), "[1 x]");
    }

    #[test]
    fn test_function_display() {
        let func = Value::Fn(Rc::new(Function {
            name: "fact".to_string(),
            params: vec![Symbol::new(TokenKind::Symbol, "n")],
            body: Some(Value::Int(0)),
            is_macro: false,
            native: None,
            env: None,
        }));
        assert_eq!(func.to_string(), "Define (fact) on ([n])");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::bool_sym(false).is_truthy());
        assert!(!Value::empty().is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
        assert!(Value::bool_sym(true).is_truthy());
    }

    #[test]
    fn test_list_elements_roundtrip() {
        let list = make_list(vec![Value::Int(1), Value::Int(2)]);
        let items = list_elements(&list).unwrap();
        assert_eq!(items.len(), 2);
        assert!(list_elements(&Value::Int(5)).is_none());
        assert_eq!(list_elements(&Value::empty()).unwrap().len(), 0);
    }
}
