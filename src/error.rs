/// Lexical errors.
///
/// Defines the error produced when the tokenizer cannot make sense of a span
/// of input. Lexing either yields a complete token stream or a single
/// `LexError` citing the offending slice; there is no partial output.
pub mod lex_error;
/// Parsing errors.
///
/// Defines the error type produced by the parser combinators. A parse error
/// is either recoverable (an alternative may still succeed) or fatal (a
/// committed branch failed and the message should reach the user as-is).
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation: type
/// mismatches, missing table keys, undefined names, dimensional conflicts,
/// domain violations and user-raised values.
pub mod runtime_error;
/// The top-level error union.
///
/// Combines the three pipeline layers (lex, parse, runtime) into a single
/// type that hosts receive and render.
pub mod lang_error;

pub use lang_error::LangError;
pub use lex_error::LexError;
pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
