// ABOUTME: REPL line helper: green prompt and bracket-aware input validation

use rustyline::highlight::Highlighter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline_derive::{Completer, Helper, Hinter};
use std::borrow::Cow;

const COLOR_PROMPT: &str = "\x1b[32m"; // green
const COLOR_RESET: &str = "\x1b[0m";

/// Helper for the interactive prompt. Colors the prompt green and keeps
/// the editor reading while brackets are unbalanced, so multi-line
/// definitions can be typed naturally.
#[derive(Completer, Helper, Hinter)]
pub struct LispyHelper;

impl LispyHelper {
    pub fn new() -> Self {
        LispyHelper
    }
}

impl Default for LispyHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for LispyHelper {
    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("{}{}{}", COLOR_PROMPT, prompt, COLOR_RESET))
        } else {
            Cow::Borrowed(prompt)
        }
    }
}

impl Validator for LispyHelper {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(validate_brackets(ctx.input()))
    }
}

fn validate_brackets(input: &str) -> ValidationResult {
    let mut parens = 0i32;
    let mut squares = 0i32;
    let mut in_string = false;
    let mut in_comment = false;

    for c in input.chars() {
        if in_comment {
            if c == '\n' {
                in_comment = false;
            }
            continue;
        }
        match c {
            '"' => in_string = !in_string,
            _ if in_string => {}
            ';' => in_comment = true,
            '(' => parens += 1,
            ')' => parens -= 1,
            '[' => squares += 1,
            ']' => squares -= 1,
            _ => {}
        }
    }

    if parens > 0 || squares > 0 || in_string {
        ValidationResult::Incomplete
    } else {
        ValidationResult::Valid(None)
    }
}
