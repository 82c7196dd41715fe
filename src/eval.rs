// ABOUTME: Evaluator: special forms, function application, macros, and the tail-call trampoline

use crate::env::Environment;
use crate::error::{LispyError, ARITY_ONE, ARITY_TWO, ARITY_TWO_OR_THREE};
use crate::lexer::TokenKind;
use crate::value::{list_elements, make_list, Function, Symbol, Value};
use std::rc::Rc;

/// Evaluate a single expression outside any tail context.
pub fn eval(expr: &Value, env: &Rc<Environment>) -> Result<Value, LispyError> {
    eval_expr(expr, env, false)
}

/// The recursive walk. `tail` is true only in positions whose value is
/// returned directly as the enclosing function's result; there a user
/// function call produces a thunk for the trampoline instead of recursing.
fn eval_expr(expr: &Value, env: &Rc<Environment>, tail: bool) -> Result<Value, LispyError> {
    if !env.consume_step() {
        return Err(LispyError::Depth);
    }
    match expr {
        Value::Int(_) | Value::Float(_) => Ok(expr.clone()),
        Value::Sym(sym) => eval_symbol(sym, expr, env),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval_expr(item, env, false)?);
            }
            Ok(Value::Array(out))
        }
        Value::Fn(func) => eval_fn_literal(func, env),
        // thunks never reach user code; self-evaluate defensively
        Value::Thunk(..) => Ok(expr.clone()),
        Value::Pair(None) => Ok(expr.clone()),
        Value::Pair(Some(_)) => eval_form(expr, env, tail),
    }
}

fn eval_symbol(sym: &Symbol, expr: &Value, env: &Rc<Environment>) -> Result<Value, LispyError> {
    match sym.kind {
        // the empty string is the one self-evaluating atom that is falsy
        TokenKind::String => {
            if sym.name.is_empty() {
                Ok(Value::bool_sym(false))
            } else {
                Ok(expr.clone())
            }
        }
        TokenKind::Symbol => env
            .lookup(&sym.name)
            .ok_or_else(|| LispyError::Unbound(sym.name.clone())),
        // booleans, quote, and bare keyword atoms evaluate to themselves
        _ => Ok(expr.clone()),
    }
}

/// Evaluating a function literal captures the current environment. Named
/// literals (everything but the reserved anonymous name "fn") are also
/// bound under their name; the closure itself is the result.
fn eval_fn_literal(func: &Rc<Function>, env: &Rc<Environment>) -> Result<Value, LispyError> {
    if func.env.is_some() {
        return Ok(Value::Fn(func.clone()));
    }
    let closed = Value::Fn(Rc::new(func.with_env(env.clone())));
    if func.name != "fn" {
        env.define(func.name.clone(), closed.clone());
    }
    Ok(closed)
}

/// Non-empty list: special forms first, then function application.
fn eval_form(expr: &Value, env: &Rc<Environment>, tail: bool) -> Result<Value, LispyError> {
    let items = match list_elements(expr) {
        Some(items) => items,
        None => return Ok(expr.clone()),
    };
    let (head, args) = match items.split_first() {
        Some(split) => split,
        None => return Ok(expr.clone()),
    };

    if let Value::Sym(sym) = head {
        match sym.kind {
            TokenKind::Define => return eval_define_binding(args, env),
            TokenKind::If => return eval_if(args, env, tail),
            TokenKind::Do => return eval_do(args, env, tail),
            TokenKind::Quote => return eval_quote(args),
            _ => {}
        }
        match sym.name.as_str() {
            "quote" => return eval_quote(args),
            "fn" => return eval_runtime_fn(args, env),
            "swap" => return eval_swap(args, env),
            _ => {}
        }
    }

    eval_application(head, args, env, tail)
}

/// `(define NAME V)`: evaluate V, bind it in the current frame, return V.
fn eval_define_binding(args: &[Value], env: &Rc<Environment>) -> Result<Value, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity_error("define", ARITY_TWO, args.len()));
    }
    let name = match &args[0] {
        Value::Sym(s) => s.name.clone(),
        other => return Err(LispyError::type_error("define", "a symbol", other)),
    };
    let value = eval_expr(&args[1], env, false)?;
    env.define(name, value.clone());
    Ok(value)
}

/// `(if COND THEN ELSE?)`: the chosen branch stays in tail position.
fn eval_if(args: &[Value], env: &Rc<Environment>, tail: bool) -> Result<Value, LispyError> {
    if args.len() < 2 || args.len() > 3 {
        return Err(LispyError::arity_error("if", ARITY_TWO_OR_THREE, args.len()));
    }
    let condition = eval_expr(&args[0], env, false)?;
    if condition.is_truthy() {
        eval_expr(&args[1], env, tail)
    } else if args.len() == 3 {
        eval_expr(&args[2], env, tail)
    } else {
        Ok(Value::bool_sym(false))
    }
}

/// `(do E1 ... En)`: left to right, only the last form in tail position.
fn eval_do(args: &[Value], env: &Rc<Environment>, tail: bool) -> Result<Value, LispyError> {
    let (last, init) = match args.split_last() {
        Some(split) => split,
        None => return Ok(Value::bool_sym(false)),
    };
    for form in init {
        eval_expr(form, env, false)?;
    }
    eval_expr(last, env, tail)
}

fn eval_quote(args: &[Value]) -> Result<Value, LispyError> {
    if args.len() != 1 {
        return Err(LispyError::arity_error("quote", ARITY_ONE, args.len()));
    }
    Ok(args[0].clone())
}

/// `(swap NAME V)`: rebind NAME in every frame that already contains it.
fn eval_swap(args: &[Value], env: &Rc<Environment>) -> Result<Value, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity_error("swap", ARITY_TWO, args.len()));
    }
    let name = match &args[0] {
        Value::Sym(s) => s.name.as_str(),
        other => return Err(LispyError::type_error("swap", "a symbol", other)),
    };
    let value = eval_expr(&args[1], env, false)?;
    if !env.set_all(name, value.clone()) {
        return Err(LispyError::Unbound(name.to_string()));
    }
    Ok(value)
}

/// A runtime-constructed `(fn [params] body)` list, as macro expansions
/// build them. The parameter array has already been evaluated if it came
/// from an array literal, so it holds plain symbols.
fn eval_runtime_fn(args: &[Value], env: &Rc<Environment>) -> Result<Value, LispyError> {
    if args.len() != 2 {
        return Err(LispyError::arity_error("fn", ARITY_TWO, args.len()));
    }
    let params = match &args[0] {
        Value::Array(items) => {
            let mut params = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Sym(s) => params.push(Symbol::new(TokenKind::Symbol, s.name.clone())),
                    other => return Err(LispyError::type_error("fn", "a parameter symbol", other)),
                }
            }
            params
        }
        other => return Err(LispyError::type_error("fn", "a parameter array", other)),
    };
    Ok(Value::Fn(Rc::new(Function {
        name: "fn".to_string(),
        params,
        body: Some(args[1].clone()),
        is_macro: false,
        native: None,
        env: Some(env.clone()),
    })))
}

/// Follow chains of symbol bindings until something that is not a plain
/// symbol turns up (indirect references like `(define g f)` via quote).
pub(crate) fn resolve_symbol(sym: &Symbol, env: &Rc<Environment>) -> Result<Value, LispyError> {
    let mut current = env
        .lookup(&sym.name)
        .ok_or_else(|| LispyError::Unbound(sym.name.clone()))?;
    loop {
        let next_name = match &current {
            Value::Sym(s) if s.kind == TokenKind::Symbol => s.name.clone(),
            _ => return Ok(current),
        };
        // the step budget bounds reference cycles like a -> b -> a
        if !env.consume_step() {
            return Err(LispyError::Depth);
        }
        current = env
            .lookup(&next_name)
            .ok_or_else(|| LispyError::Unbound(next_name))?;
    }
}

fn eval_application(
    head: &Value,
    args: &[Value],
    env: &Rc<Environment>,
    tail: bool,
) -> Result<Value, LispyError> {
    let callee = match head {
        Value::Sym(sym) if sym.kind == TokenKind::Symbol => resolve_symbol(sym, env)?,
        _ => eval_expr(head, env, false)?,
    };

    match callee {
        Value::Fn(func) if func.is_macro => expand_macro(&func, args, env),
        Value::Fn(func) => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, env, false)?);
            }
            apply(&func, values, env, tail)
        }
        other => {
            // a non-callable head: `(x)` unwraps to the bound value, and a
            // list-headed list groups its elements, returning the last.
            // Both shapes occur in prelude macro expansions.
            if args.is_empty() {
                return Ok(other);
            }
            if matches!(head, Value::Pair(_)) {
                if let Some((last, init)) = args.split_last() {
                    for form in init {
                        eval_expr(form, env, false)?;
                    }
                    return eval_expr(last, env, tail);
                }
            }
            let context = match head {
                Value::Sym(s) => s.name.clone(),
                _ => "apply".to_string(),
            };
            Err(LispyError::type_error(&context, "a function", &other))
        }
    }
}

/// Macro protocol: bind the unevaluated argument list to the macro's
/// single formal, evaluate the body to get the expansion, then evaluate
/// the expansion in the caller's environment. Neither step is in tail
/// position, so expansion errors surface at the call site.
fn expand_macro(
    func: &Rc<Function>,
    args: &[Value],
    caller: &Rc<Environment>,
) -> Result<Value, LispyError> {
    let mut items = args.to_vec();
    if let Some(first) = items.first() {
        if let Some(payload) = quoted_payload(first) {
            items[0] = payload;
        }
    }
    let arg_list = make_list(items);

    let formal = func
        .params
        .first()
        .ok_or_else(|| LispyError::arity_error(&func.name, ARITY_ONE, 0))?;
    let definition_env = func.env.clone().unwrap_or_else(|| caller.clone());
    let frame = Environment::call_frame(definition_env, caller);
    frame.define(formal.name.clone(), arg_list);

    let body = match &func.body {
        Some(body) => body,
        None => {
            return Err(LispyError::type_error(
                &func.name,
                "a macro body",
                &Value::Fn(func.clone()),
            ))
        }
    };
    let expansion = eval_expr(body, &frame, false)?;
    eval_expr(&expansion, caller, false)
}

/// Strips one layer of quoting: `(quote X)` yields `X`.
fn quoted_payload(value: &Value) -> Option<Value> {
    let items = list_elements(value)?;
    match items.as_slice() {
        [Value::Sym(s), payload]
            if s.kind == TokenKind::Quote || s.name == "quote" =>
        {
            Some(payload.clone())
        }
        _ => None,
    }
}

/// Apply a function to already-evaluated arguments. In tail position a
/// user function becomes a thunk; otherwise the trampoline runs here.
pub(crate) fn apply(
    func: &Rc<Function>,
    args: Vec<Value>,
    caller: &Rc<Environment>,
    tail: bool,
) -> Result<Value, LispyError> {
    if let Some(native) = func.native {
        return native(caller, &func.name, &args);
    }
    let frame = bind_call_frame(func, args, caller)?;
    if tail {
        return Ok(Value::Thunk(func.clone(), frame));
    }
    trampoline(func.clone(), frame)
}

/// Apply an already-resolved function to pre-evaluated arguments (the
/// `applyTo` intrinsic). Macros cannot be applied this way.
pub fn apply_function(
    func: &Rc<Function>,
    args: Vec<Value>,
    env: &Rc<Environment>,
) -> Result<Value, LispyError> {
    if func.is_macro {
        return Err(LispyError::type_error(
            "applyTo",
            "a function",
            &Value::Fn(func.clone()),
        ));
    }
    apply(func, args, env, false)
}

/// Bind formals to actuals in a fresh frame over the definition site.
/// A `&` in the parameter vector binds the next formal to the remaining
/// arguments as a list.
fn bind_call_frame(
    func: &Rc<Function>,
    args: Vec<Value>,
    caller: &Rc<Environment>,
) -> Result<Rc<Environment>, LispyError> {
    let definition_env = func.env.clone().unwrap_or_else(|| caller.clone());
    let frame = Environment::call_frame(definition_env, caller);

    let params = &func.params;
    let fixed = params
        .iter()
        .position(|p| p.name == "&")
        .unwrap_or(params.len());
    let expected = if fixed < params.len() {
        format!("at least {}", fixed)
    } else {
        fixed.to_string()
    };

    let mut index = 0;
    for (slot, param) in params.iter().enumerate() {
        if param.name == "&" {
            let rest_name = match params.get(slot + 1) {
                Some(p) => p.name.clone(),
                None => {
                    return Err(LispyError::Parse(format!(
                        "{}: & must be followed by a parameter name",
                        func.name
                    )))
                }
            };
            if index > args.len() {
                return Err(LispyError::arity_error(&func.name, expected, args.len()));
            }
            frame.define(rest_name, make_list(args[index..].to_vec()));
            return Ok(frame);
        }
        match args.get(index) {
            Some(value) => frame.define(param.name.clone(), value.clone()),
            None => return Err(LispyError::arity_error(&func.name, expected, args.len())),
        }
        index += 1;
    }

    if index != args.len() {
        return Err(LispyError::arity_error(&func.name, expected, args.len()));
    }
    Ok(frame)
}

/// Unrolls tail calls: evaluate the body, and while it comes back as a
/// thunk, swap in the deferred function and frame and go again. The step
/// budget is restored to its entry value on every bounce so tail loops
/// are not charged against the recursion ceiling.
fn trampoline(mut func: Rc<Function>, mut frame: Rc<Environment>) -> Result<Value, LispyError> {
    let entry_steps = frame.steps();
    loop {
        let body = match &func.body {
            Some(body) => body.clone(),
            None => {
                return Err(LispyError::type_error(
                    &func.name,
                    "a function body",
                    &Value::Fn(func.clone()),
                ))
            }
        };
        match eval_expr(&body, &frame, true)? {
            Value::Thunk(next_func, next_frame) => {
                next_frame.reset_steps(entry_steps);
                func = next_func;
                frame = next_frame;
            }
            other => return Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::register_builtins;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn test_env() -> Rc<Environment> {
        let env = Environment::new();
        register_builtins(&env);
        env
    }

    /// Evaluate every form in `source` and return the printed images.
    fn run(source: &str, env: &Rc<Environment>) -> Result<Vec<String>, LispyError> {
        let forms = parse(&tokenize(source)?)?;
        let mut out = Vec::new();
        for form in &forms {
            env.reset_steps(crate::config::STEP_CEILING);
            out.push(eval(form, env)?.to_string());
        }
        Ok(out)
    }

    fn run_last(source: &str) -> String {
        let env = test_env();
        run(source, &env).unwrap().pop().unwrap()
    }

    #[test]
    fn test_self_evaluating_atoms() {
        assert_eq!(run_last("42"), "42");
        assert_eq!(run_last("2.5"), "2.5");
        assert_eq!(run_last("\"hello\""), "hello");
        assert_eq!(run_last("true"), "true");
        assert_eq!(run_last("false"), "false");
        assert_eq!(run_last("()"), "()");
    }

    #[test]
    fn test_empty_string_evaluates_false() {
        assert_eq!(run_last("\"\""), "false");
        assert_eq!(run_last("(if \"\" 1 2)"), "2");
    }

    #[test]
    fn test_symbol_lookup() {
        let env = test_env();
        env.define("x".to_string(), Value::Int(7));
        assert_eq!(run("x", &env).unwrap(), vec!["7"]);
    }

    #[test]
    fn test_unbound_symbol() {
        let env = test_env();
        assert!(matches!(run("ghost", &env), Err(LispyError::Unbound(_))));
    }

    #[test]
    fn test_define_binding_returns_value() {
        let env = test_env();
        assert_eq!(run("(define x 7)", &env).unwrap(), vec!["7"]);
        assert!(matches!(env.lookup("x"), Some(Value::Int(7))));
    }

    #[test]
    fn test_define_function_canonical_image() {
        assert_eq!(
            run_last("(define square [x] (* x x))"),
            "Define (square) on ([x])"
        );
    }

    #[test]
    fn test_function_call() {
        assert_eq!(run_last("(define square [x] (* x x)) (square 9)"), "81");
    }

    #[test]
    fn test_array_evaluates_elementwise() {
        assert_eq!(run_last("(define x 2) [1 x (+ x 1)]"), "[1 2 3]");
    }

    #[test]
    fn test_if_branches() {
        assert_eq!(run_last("(if true 1 2)"), "1");
        assert_eq!(run_last("(if false 1 2)"), "2");
        assert_eq!(run_last("(if () 1 2)"), "2");
        assert_eq!(run_last("(if 0 1 2)"), "1");
        assert_eq!(run_last("(if false 1)"), "false");
    }

    #[test]
    fn test_do_returns_last() {
        assert_eq!(run_last("(do 1 2 3)"), "3");
        assert_eq!(run_last("(do)"), "false");
        assert_eq!(run_last("(do (define x 1) (define y 2) (+ x y))"), "3");
    }

    #[test]
    fn test_quote_is_not_evaluated() {
        assert_eq!(run_last("(quote (+ 1 2))"), "(+ 1 2)");
        assert_eq!(run_last("'(1 2 3)"), "(1 2 3)");
        assert_eq!(run_last("'x"), "x");
    }

    #[test]
    fn test_swap_rewrites_ancestor_frames() {
        let env = test_env();
        let out = run(
            "(define n 1) (define bump [] (swap n (+ n 1))) (bump) n",
            &env,
        )
        .unwrap();
        assert_eq!(out.last().unwrap(), "2");
    }

    #[test]
    fn test_swap_unbound_errors() {
        let env = test_env();
        assert!(matches!(
            run("(swap ghost 1)", &env),
            Err(LispyError::Unbound(_))
        ));
    }

    #[test]
    fn test_anonymous_fn_application() {
        assert_eq!(run_last("((fn [x] (+ x 1)) 41)"), "42");
    }

    #[test]
    fn test_closure_captures_definition_site() {
        let out = run_last(
            "(define make-adder [n] (fn [x] (+ x n)))
             (define add5 (make-adder 5))
             (add5 10)",
        );
        assert_eq!(out, "15");
    }

    #[test]
    fn test_call_local_defines_do_not_leak() {
        let env = test_env();
        let out = run(
            "(define f [] (do (define secret 5) secret)) (f)",
            &env,
        )
        .unwrap();
        assert_eq!(out.last().unwrap(), "5");
        assert!(env.lookup("secret").is_none());
    }

    #[test]
    fn test_variadic_parameters() {
        let env = test_env();
        let out = run("(define f [a & rest] rest) (f 1 2 3 4)", &env).unwrap();
        assert_eq!(out.last().unwrap(), "(2 3 4)");
        let out = run("(define g [& all] all) (g)", &env).unwrap();
        assert_eq!(out.last().unwrap(), "()");
    }

    #[test]
    fn test_arity_mismatch() {
        let env = test_env();
        assert!(matches!(
            run("(define f [a b] a) (f 1)", &env),
            Err(LispyError::Arity { .. })
        ));
    }

    #[test]
    fn test_not_callable() {
        let env = test_env();
        assert!(matches!(
            run("(42 1 2)", &env),
            Err(LispyError::Type { .. })
        ));
    }

    #[test]
    fn test_trivial_wrapper_unwrap() {
        assert_eq!(run_last("(define x 5) (x)"), "5");
    }

    #[test]
    fn test_indirect_symbol_resolution() {
        assert_eq!(run_last("(define f [x] x) (define g 'f) (g 9)"), "9");
    }

    #[test]
    fn test_macro_receives_unevaluated_args() {
        let out = run_last(
            "(macro unless [t] (list 'if (car t) (car (cdr (cdr t))) (car (cdr t))))
             (unless false \"yes\" \"no\")",
        );
        assert_eq!(out, "yes");
    }

    #[test]
    fn test_macro_strips_leading_quote() {
        let out = run_last(
            "(macro first-of [t] (list 'quote (car (car t))))
             (first-of '(a b c))",
        );
        assert_eq!(out, "a");
    }

    #[test]
    fn test_tail_recursion_runs_deep() {
        let out = run_last(
            "(define loop [n] (if (= n 0) \"done\" (loop (- n 1))))
             (loop 10000)",
        );
        assert_eq!(out, "done");
    }

    #[test]
    fn test_tail_position_through_do() {
        let out = run_last(
            "(define countdown [n] (if (= n 0) 0 (do (countdown (- n 1)))))
             (countdown 10000)",
        );
        assert_eq!(out, "0");
    }

    #[test]
    fn test_runaway_recursion_hits_step_ceiling() {
        let env = Environment::with_limit(500);
        register_builtins(&env);
        let forms = parse(&tokenize("(define f [n] (+ 1 (f n))) (f 0)").unwrap()).unwrap();
        eval(&forms[0], &env).unwrap();
        assert!(matches!(eval(&forms[1], &env), Err(LispyError::Depth)));
    }

    #[test]
    fn test_non_tail_recursion_still_works() {
        assert_eq!(
            run_last("(define fact [n] (if (<= n 1) 1 (* n (fact (- n 1))))) (fact 6)"),
            "720"
        );
    }
}
