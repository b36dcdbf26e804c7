use std::fs;

use calq::{
    interpreter::parser::options::{Associativity, Priority},
    standard_session, Interpreter,
};
use clap::Parser;
use rustyline::{error::ReadlineError, DefaultEditor};

/// calq is a small functional language with unit-aware decimal arithmetic,
/// first-class tables and adjustable operator precedences.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// A script file to run. Without one, calq starts a REPL.
    script: Option<String>,

    /// Evaluate a single expression and print its value.
    #[arg(short, long)]
    eval: Option<String>,

    /// Pipe mode prints the last value a script produces.
    #[arg(short, long)]
    pipe_mode: bool,
}

fn main() {
    let args = Args::parse();

    if let Some(source) = args.eval {
        let session = standard_session("eval");
        match session.run_multiline_return_last(&source) {
            Ok(value) => println!("{value}"),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            },
        }
        return;
    }

    if let Some(path) = args.script {
        let source = fs::read_to_string(&path).unwrap_or_else(|_| {
            eprintln!("Failed to read the input file '{path}'. Perhaps this file does not exist?");
            std::process::exit(1);
        });
        let session = standard_session(&path);
        match session.run_multiline(&source) {
            Ok(values) => {
                if args.pipe_mode {
                    if let Some(value) = values.last() {
                        println!("{value}");
                    }
                }
            },
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            },
        }
        return;
    }

    repl();
}

/// The interactive loop: read, evaluate, print, repeat. An interrupt while
/// reading asks before exiting; end-of-input exits directly.
fn repl() {
    let session = standard_session("repl");
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("Failed to start the line editor: {e}");
            std::process::exit(1);
        },
    };

    println!("calq — type an expression, or .help");
    loop {
        match editor.readline("calq> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(trimmed);
                if handle_command(&session, trimmed) {
                    continue;
                }
                match session.run_multiline(&line) {
                    Ok(values) => {
                        for value in values {
                            println!("{value}");
                        }
                    },
                    Err(e) => eprintln!("{e}"),
                }
            },
            Err(ReadlineError::Interrupted) => match editor.readline("Exit [y/n]? ") {
                Ok(answer) if answer.trim().eq_ignore_ascii_case("y") => break,
                Ok(_) => {},
                Err(_) => break,
            },
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Failed to read input: {e}");
                break;
            },
        }
    }
}

/// REPL meta commands, all starting with a dot. Returns whether the line
/// was one.
fn handle_command(session: &Interpreter, line: &str) -> bool {
    if line == ".help" {
        println!(".help                               this text");
        println!(".priority <op> <strength> <l|r>     rebind an operator's precedence");
        println!(".quit                               leave the REPL");
        return true;
    }
    if line == ".quit" {
        std::process::exit(0);
    }
    if let Some(rest) = line.strip_prefix(".priority") {
        set_priority(session, rest);
        return true;
    }
    false
}

/// `.priority <op> <strength> <left|right>` — the hook into the parser's
/// shared operator table; the next expression parses under the new table.
fn set_priority(session: &Interpreter, rest: &str) {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let [name, strength, direction] = parts.as_slice() else {
        eprintln!("Usage: .priority <operator> <strength> <left|right>");
        return;
    };

    let Ok(strength) = strength.parse::<i64>() else {
        eprintln!("The strength must be an integer, not '{strength}'.");
        return;
    };
    let associativity = match *direction {
        "left" | "l" => Associativity::Left,
        "right" | "r" => Associativity::Right,
        other => {
            eprintln!("The direction must be 'left' or 'right', not '{other}'.");
            return;
        },
    };

    session.options().borrow_mut().set_priority(*name,
                                                Priority { strength,
                                                           associativity });
    println!("{name} now binds at {strength}, {direction}-associative.");
}
