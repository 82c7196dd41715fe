// ABOUTME: End-to-end tests driving the full lex -> parse -> eval pipeline

use lispy::env::Environment;
use lispy::error::LispyError;
use lispy::{eval_source, new_root_env};
use std::rc::Rc;

/// Root environment with intrinsics and the prelude loaded.
fn setup() -> Rc<Environment> {
    new_root_env().expect("root environment should build")
}

fn run(env: &Rc<Environment>, source: &str) -> Vec<String> {
    eval_source(source, env).expect("evaluation should succeed")
}

fn run_last(source: &str) -> String {
    let env = setup();
    run(&env, source).pop().expect("at least one form")
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn test_arithmetic() {
    assert_eq!(run_last("(+ 1 2 3)"), "6");
    assert_eq!(run_last("(/ 10 4)"), "2");
    assert_eq!(run_last("(/ 10.0 4)"), "2.5");
    assert_eq!(run_last("(# 2 10)"), "1024");
}

#[test]
fn test_mixed_arithmetic_widens() {
    assert_eq!(run_last("(+ 1 2 0.5)"), "3.5");
    assert_eq!(run_last("(* 2 2.0)"), "4.0");
    assert_eq!(run_last("(% 17 5)"), "2");
    assert_eq!(run_last("(% 7.9 3.2)"), "1");
}

// ============================================================================
// Conditionals and lookup
// ============================================================================

#[test]
fn test_define_then_conditional() {
    let env = setup();
    let results = run(&env, "(define x 7) (if (> x 3) \"big\" \"small\")");
    assert_eq!(results, vec!["7", "big"]);
}

#[test]
fn test_truthiness_table() {
    assert_eq!(run_last("(if () 1 2)"), "2");
    assert_eq!(run_last("(if false 1 2)"), "2");
    assert_eq!(run_last("(if 0 1 2)"), "1");
    assert_eq!(run_last("(if \"\" 1 2)"), "2");
    assert_eq!(run_last("(if \"x\" 1 2)"), "1");
    assert_eq!(run_last("(if [] 1 2)"), "1");
}

// ============================================================================
// Closures and recursion
// ============================================================================

#[test]
fn test_factorial() {
    let out = run_last(
        "(define fact [n] (if (<= n 1) 1 (* n (fact (- n 1)))))
         (fact 6)",
    );
    assert_eq!(out, "720");
}

#[test]
fn test_closures_capture_definition_site() {
    let out = run_last(
        "(define make-adder [n] (fn [x] (+ x n)))
         (define add5 (make-adder 5))
         (add5 10)",
    );
    assert_eq!(out, "15");
}

#[test]
fn test_tail_recursion_50k() {
    let out = run_last(
        "(define loop [n] (if (= n 0) \"done\" (loop (- n 1))))
         (loop 50000)",
    );
    assert_eq!(out, "done");
}

#[test]
fn test_tail_recursion_100k_constant_stack() {
    // would blow the host stack (and the step ceiling) without the
    // trampoline
    let out = run_last(
        "(define loop [n] (if (= n 0) \"done\" (loop (- n 1))))
         (loop 100000)",
    );
    assert_eq!(out, "done");
}

// ============================================================================
// Quoting and list operations
// ============================================================================

#[test]
fn test_quote_and_list_ops() {
    assert_eq!(run_last("(car (quote (1 2 3)))"), "1");
    assert_eq!(run_last("(cdr '(1 2 3))"), "(2 3)");
    assert_eq!(run_last("(cons 0 '(1 2))"), "(0 1 2)");
}

#[test]
fn test_cons_car_cdr_laws() {
    assert_eq!(run_last("(car (cons 9 '(1 2)))"), "9");
    assert_eq!(run_last("(cdr (cons 9 '(1 2)))"), "(1 2)");
    assert_eq!(run_last("(cdr '(1))"), "()");
}

#[test]
fn test_quote_never_invokes_intrinsics() {
    // the division inside the quoted form must not run
    assert_eq!(run_last("(quote (/ 1 0))"), "(/ 1 0)");
    assert_eq!(run_last("'(println \"nope\")"), "(println nope)");
}

#[test]
fn test_structural_list_equality() {
    assert_eq!(run_last("(= '(1 2 3) '(1 2 3))"), "true");
    assert_eq!(run_last("(= '(1 2) '(1 2 3))"), "false");
    assert_eq!(run_last("(= '(1 (2 3)) '(1 (2 3)))"), "true");
    assert_eq!(run_last("(= '(1 2) '(1 9))"), "false");
}

// ============================================================================
// Macros
// ============================================================================

#[test]
fn test_unless_macro_from_scratch() {
    let out = run_last(
        "(macro unless [t] (list 'if (car t) (car (cdr (cdr t))) (car (cdr t))))
         (unless false \"yes\" \"no\")",
    );
    assert_eq!(out, "yes");
}

#[test]
fn test_when_expansion_equals_if() {
    assert_eq!(run_last("(when (> 2 1) \"hit\")"), "hit");
    assert_eq!(run_last("(if (> 2 1) \"hit\")"), "hit");
    assert_eq!(run_last("(when false \"hit\")"), run_last("(if false \"hit\")"));
}

// ============================================================================
// Printing stability
// ============================================================================

#[test]
fn test_parse_print_reparse_is_stable() {
    let source = "(define x 7) '(1 (2 3) [4 5] \"s\" 2.5)";
    let tokens = lispy::lexer::tokenize(source).unwrap();
    let forms = lispy::parser::parse(&tokens).unwrap();
    for form in &forms {
        let printed = form.to_string();
        let reparsed =
            lispy::parser::parse(&lispy::lexer::tokenize(&printed).unwrap()).unwrap();
        assert_eq!(reparsed.len(), 1);
        assert_eq!(reparsed[0].to_string(), printed);
    }
}

#[test]
fn test_function_canonical_image() {
    assert_eq!(
        run_last("(define fact [n] (if (<= n 1) 1 (* n (fact (- n 1)))))"),
        "Define (fact) on ([n])"
    );
    assert_eq!(run_last("car"), "#built-in");
}

// ============================================================================
// Intrinsics beyond the operators
// ============================================================================

#[test]
fn test_type_inspection() {
    assert_eq!(run_last("(type 1)"), "int");
    assert_eq!(run_last("(type 1.5)"), "float");
    assert_eq!(run_last("(type 'x)"), "symbol");
    assert_eq!(run_last("(type '(1 2))"), "list");
}

#[test]
fn test_number_and_str_and_symbol() {
    assert_eq!(run_last("(number 3)"), "3.0");
    assert_eq!(run_last("(number \"2.5\")"), "2.5");
    assert_eq!(run_last("(str \"a\" 1 'b)"), "a1b");
    assert_eq!(run_last("(symbol \"abc\")"), "abc");
    assert_eq!(run_last("(type (symbol \"abc\"))"), "symbol");
}

#[test]
fn test_readstring_returns_data() {
    assert_eq!(run_last("(readstring \"(+ 1 2)\")"), "(+ 1 2)");
    assert_eq!(run_last("(car (readstring \"(a b)\"))"), "a");
}

#[test]
fn test_quote_predicate() {
    assert_eq!(run_last("(quote? 'quote)"), "true");
    assert_eq!(run_last("(quote? 'x)"), "false");
}

#[test]
fn test_apply_to() {
    assert_eq!(run_last("(applyTo + (list 1 2 3))"), "6");
    assert_eq!(run_last("(define f [a b] (* a b)) (applyTo f '(6 7))"), "42");
}

#[test]
fn test_println_returns_its_argument() {
    assert_eq!(run_last("(println \"hi\")"), "hi");
}

#[test]
fn test_logic_fold() {
    assert_eq!(run_last("(and 1 2 3)"), "true");
    assert_eq!(run_last("(and 1 false)"), "false");
    assert_eq!(run_last("(or false ())"), "false");
    assert_eq!(run_last("(or false 1)"), "true");
    assert_eq!(run_last("(not ())"), "true");
}

#[test]
fn test_comparison_fold() {
    assert_eq!(run_last("(< 1 2 3)"), "true");
    assert_eq!(run_last("(< 1 3 2)"), "false");
    assert_eq!(run_last("(>= 3 3 2)"), "true");
    assert_eq!(run_last("(= 1 1.0)"), "true");
    assert_eq!(run_last("(< \"abc\" \"abd\")"), "true");
}

// ============================================================================
// swap and shadowing
// ============================================================================

#[test]
fn test_swap_updates_enclosing_scope() {
    let env = setup();
    let results = run(
        &env,
        "(define counter 0)
         (define bump [] (swap counter (+ counter 1)))
         (bump)
         (bump)
         counter",
    );
    assert_eq!(results.last().unwrap(), "2");
}

#[test]
fn test_intrinsic_shadowing_is_call_local() {
    let env = setup();
    let results = run(
        &env,
        "(define weird [] (do (define + (fn [a b] 99)) (+ 1 2)))
         (weird)
         (+ 1 2)",
    );
    assert_eq!(results[1], "99");
    assert_eq!(results[2], "3");
}

// ============================================================================
// Errors surface as recoverable values at the API boundary
// ============================================================================

#[test]
fn test_errors_are_recoverable() {
    let env = setup();
    assert!(matches!(eval_source("(", &env), Err(LispyError::Parse(_))));
    assert!(matches!(eval_source("\"x", &env), Err(LispyError::Lex(_))));
    assert!(matches!(
        eval_source("ghost", &env),
        Err(LispyError::Unbound(_))
    ));
    assert!(matches!(
        eval_source("(/ 1 0)", &env),
        Err(LispyError::DivideByZero { .. })
    ));
    assert!(matches!(
        eval_source("(car)", &env),
        Err(LispyError::Arity { .. })
    ));
    assert!(matches!(
        eval_source("(+ 1 \"x\")", &env),
        Err(LispyError::Type { .. })
    ));

    // the environment stays usable after a failure
    assert_eq!(eval_source("(+ 1 2)", &env).unwrap(), vec!["3"]);
}

#[test]
fn test_runaway_recursion_aborts_with_depth_error() {
    let env = setup();
    eval_source("(define f [n] (+ 1 (f n)))", &env).unwrap();
    assert!(matches!(
        eval_source("(f 0)", &env),
        Err(LispyError::Depth)
    ));
    // and the next form gets a fresh budget
    assert_eq!(eval_source("(+ 1 1)", &env).unwrap(), vec!["2"]);
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn test_comments_are_dropped() {
    let env = setup();
    let results = run(
        &env,
        "; a line comment\n(+ 1 1) ;; a block ;; (+ 2 2)",
    );
    assert_eq!(results, vec!["2", "4"]);
}
