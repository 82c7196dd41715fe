//! Console I/O: println, readline

use crate::env::Environment;
use crate::error::{LispyError, ARITY_ZERO_OR_ONE};
use crate::value::Value;
use std::io::{BufRead, Write};
use std::rc::Rc;

/// Print the arguments space-separated with a trailing newline; the last
/// argument is the result (false when called with none).
pub fn builtin_println(
    _env: &Rc<Environment>,
    _name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    let text = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", text);
    Ok(args.last().cloned().unwrap_or_else(|| Value::bool_sym(false)))
}

/// Read one line from stdin, printing the optional prompt argument first.
/// The trailing newline is stripped; EOF yields the empty string.
pub fn builtin_readline(
    _env: &Rc<Environment>,
    name: &str,
    args: &[Value],
) -> Result<Value, LispyError> {
    if args.len() > 1 {
        return Err(LispyError::arity_error(name, ARITY_ZERO_OR_ONE, args.len()));
    }
    if let Some(prompt) = args.first() {
        print!("{}", prompt);
        let _ = std::io::stdout().flush();
    }
    let mut line = String::new();
    let _ = std::io::stdin().lock().read_line(&mut line);
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Value::string(line))
}

/// Register all console builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.define("println".to_string(), Value::native("println", builtin_println));
    env.define(
        "readline".to_string(),
        Value::native("readline", builtin_readline),
    );
}
