//! The read-eval-print driver: the only I/O surface of the interpreter.
//!
//! One long-lived environment is built at startup. With stdin on a
//! terminal this runs an interactive line-edited session; otherwise it
//! evaluates the whole input stream expression by expression, stopping at
//! end of input, and halts at the first error with a nonzero exit.

use std::io::{IsTerminal, Read};
use std::process;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use lisplet::evaluator::{self, Environment};
use lisplet::lexer::Tokenizer;
use lisplet::parser;

fn main() {
    let env = evaluator::core_environment();
    if std::io::stdin().is_terminal() {
        run_interactive(&env);
    } else if let Err(code) = run_batch(&env) {
        process::exit(code);
    }
}

/// Evaluate everything on stdin against `env`, printing one serialized
/// result per top-level expression. The first failure stops evaluation.
fn run_batch(env: &Environment) -> Result<(), i32> {
    let mut input = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("error: {err}");
        return Err(1);
    }
    let mut tokens = Tokenizer::new(&input);
    loop {
        match parser::parse(&mut tokens) {
            Ok(None) => return Ok(()),
            Ok(Some(expr)) => match evaluator::evaluate(&expr, env) {
                Ok(value) => println!("{value}"),
                Err(err) => {
                    eprintln!("error: {err}");
                    return Err(1);
                }
            },
            Err(err) => {
                eprintln!("error: {err}");
                return Err(1);
            }
        }
    }
}

fn run_interactive(env: &Environment) {
    println!("lisplet - a minimal S-expression interpreter");
    println!("Enter expressions like (+ 1 2); Ctrl+D exits.");

    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("error: could not initialize the line editor: {err}");
            process::exit(1);
        }
    };

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);
                evaluate_line(line, env);
            }
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
            Err(err) => {
                eprintln!("error: {err}");
                break;
            }
        }
    }
}

/// Each line is a fresh input item: an error abandons the rest of the
/// line, but the session and its environment carry on.
fn evaluate_line(line: &str, env: &Environment) {
    let mut tokens = Tokenizer::new(line);
    loop {
        match parser::parse(&mut tokens) {
            Ok(None) => return,
            Ok(Some(expr)) => match evaluator::evaluate(&expr, env) {
                Ok(value) => println!("{value}"),
                Err(err) => {
                    println!("error: {err}");
                    return;
                }
            },
            Err(err) => {
                println!("error: {err}");
                return;
            }
        }
    }
}
