// ABOUTME: Library surface exposing the interpreter core

pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod highlighter;
pub mod lexer;
pub mod parser;
pub mod prelude;
pub mod value;

use env::Environment;
use error::LispyError;
use std::rc::Rc;

/// Fresh top-level environment with every intrinsic registered and the
/// embedded prelude evaluated.
pub fn new_root_env() -> Result<Rc<Environment>, LispyError> {
    let env = Environment::new();
    builtins::register_builtins(&env);
    prelude::load(&env)?;
    Ok(env)
}

/// Evaluate source text against `env`, returning the printed image of
/// each top-level form in order. The step budget refills before each
/// form, so a depth abort poisons only the form that caused it.
pub fn eval_source(source: &str, env: &Rc<Environment>) -> Result<Vec<String>, LispyError> {
    let tokens = lexer::tokenize(source)?;
    let forms = parser::parse(&tokens)?;
    let mut results = Vec::with_capacity(forms.len());
    for form in &forms {
        env.reset_steps(config::STEP_CEILING);
        results.push(eval::eval(form, env)?.to_string());
    }
    Ok(results)
}
