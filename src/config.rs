// ABOUTME: Configuration and constants for the Lispy interpreter

pub const VERSION: &str = "1.0.0";
pub const WELCOME_MESSAGE: &str = "Lispy v1.0";
pub const WELCOME_SUBTITLE: &str = "A homoiconic Lisp with tail calls and fexpr macros";

/// The REPL prompt, colored green by the line helper.
pub const PROMPT: &str = "lispy> ";

/// File the REPL persists its line history to.
pub const HISTORY_FILE: &str = ".lispy_history";

/// Evaluation budget for a single top-level form. Every node evaluated
/// decrements the active frame's counter; hitting zero aborts with a
/// depth error. Refilled before each top-level form.
pub const STEP_CEILING: usize = 200_000;
