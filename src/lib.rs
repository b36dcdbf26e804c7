//! # calq
//!
//! calq is a small functional language interpreter written in Rust. Every
//! number is an arbitrary-precision decimal annotated with SI dimensions,
//! every function takes exactly one argument, and tables — ordered
//! string-keyed records — are the namespace, record and module construct.
//! The pipeline is a lexer, a combinator parser with runtime-adjustable
//! operator precedences resolved by shunting yard, and a tree-walking
//! evaluator with lexical closures.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` enum and related types that represent
/// source code as a tree: expressions, lambda parameters and the lambda
/// itself with its captured-name analysis. It also re-synthesises surface
/// syntax from trees for the reflective printer.
///
/// # Responsibilities
/// - Defines expression and pattern types for all language constructs.
/// - Computes captured names when lambdas are built.
/// - Unparses trees back into the syntax they came from.
pub mod ast;
/// Provides unified error types for every pipeline stage.
///
/// This module defines all errors that can be raised while lexing, parsing
/// or evaluating code, and the `LangError` union hosts receive. Rendering
/// is the host's job; these types only carry the facts.
///
/// # Responsibilities
/// - Defines error types for all failure modes (lexer, parser, evaluator).
/// - Distinguishes recoverable from fatal parse failures.
/// - Supports integration with standard error handling traits.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, runtime values
/// and the prelude, and exposes the `Interpreter` API and the `IoHandle`
/// trait hosts implement.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, values.
/// - Provides entry points for running lines, scripts and parsed trees.
/// - Delegates I/O and module resolution to the host.
pub mod interpreter;

pub use interpreter::{Interpreter, IoHandle, StdHandle};

/// Runs a source string with the standard host and returns nothing.
///
/// This is the convenience entry the CLI and the book test share: build a
/// standard session, evaluate every expression, optionally print the last
/// value.
///
/// # Errors
/// Returns the first `LangError` the pipeline produces.
///
/// # Examples
/// ```
/// // The last value prints only when asked to.
/// assert!(calq::run_source("2 + 2", false).is_ok());
///
/// // An undefined name is a runtime error.
/// assert!(calq::run_source("x + 1", false).is_err());
/// ```
pub fn run_source(source: &str, print_last: bool) -> Result<(), Box<dyn std::error::Error>> {
    let interpreter = StdHandle::new("main.calq").interpreter();
    let values = interpreter.run_multiline(source)?;

    if print_last {
        if let Some(value) = values.last() {
            println!("{value}");
        }
    }
    Ok(())
}

/// Re-exported so hosts can hold values and environments without spelling
/// out module paths.
pub use interpreter::value::core::Value;

/// A session wired to the standard host; the REPL's constructor.
#[must_use]
pub fn standard_session(location: &str) -> Interpreter {
    StdHandle::new(location).interpreter()
}
