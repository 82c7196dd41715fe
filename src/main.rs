// ABOUTME: CLI entry point: script mode and the interactive REPL

use clap::Parser;
use lispy::config::{HISTORY_FILE, PROMPT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use lispy::highlighter::LispyHelper;
use lispy::{eval_source, new_root_env};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;

/// Lispy interpreter
#[derive(Parser, Debug)]
#[command(name = "lispy")]
#[command(version = VERSION)]
#[command(about = "A homoiconic Lisp interpreter with tail calls and fexpr macros")]
struct CliArgs {
    /// Script file to evaluate (starts the REPL when omitted)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Force the interactive REPL
    #[arg(long = "repl", short = 'r')]
    repl: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let outcome = match (&args.script, args.repl) {
        (Some(script), false) => run_script(script),
        _ => run_repl(),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

/// Evaluate a file against a fresh root environment, printing the value
/// of each top-level form.
fn run_script(path: &PathBuf) -> Result<(), String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let env = new_root_env().map_err(|e| e.to_string())?;
    let results = eval_source(&source, &env).map_err(|e| e.to_string())?;
    for result in results {
        println!("{}", result);
    }
    Ok(())
}

/// The interactive loop: one persistent environment, line history, and
/// error recovery that keeps the session alive.
fn run_repl() -> Result<(), String> {
    let env = new_root_env().map_err(|e| e.to_string())?;

    let config = Config::builder().auto_add_history(true).build();
    let mut editor: Editor<LispyHelper, DefaultHistory> = Editor::with_config(config)
        .map_err(|e| format!("failed to initialize the REPL: {}", e))?;
    editor.set_helper(Some(LispyHelper::new()));
    let _ = editor.load_history(HISTORY_FILE);

    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match trimmed {
                    "(quit)" | "(exit)" => {
                        println!("Goodbye!");
                        break;
                    }
                    "(clear)" => {
                        print!("\x1B[2J\x1B[H");
                        continue;
                    }
                    _ => {}
                }
                match eval_source(trimmed, &env) {
                    Ok(results) => {
                        for result in results {
                            println!("=> {}", result);
                        }
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => return Err(err.to_string()),
        }
    }

    let _ = editor.save_history(HISTORY_FILE);
    Ok(())
}
