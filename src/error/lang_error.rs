use crate::error::{LexError, ParseError, RuntimeError};

#[derive(Debug, Clone, PartialEq)]
/// The union of everything that can go wrong between source text and value.
///
/// Hosts receive a `LangError` from the `Interpreter` API and render it; the
/// core never prints. The three variants correspond to the three pipeline
/// layers, and a failure in an earlier layer prevents the later ones from
/// running at all.
pub enum LangError {
    /// The tokenizer could not consume the input.
    Lex(LexError),
    /// The token stream did not form an expression.
    Parse(ParseError),
    /// Evaluation of a well-formed expression failed.
    Runtime(RuntimeError),
}

impl std::fmt::Display for LangError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex(e) => write!(f, "Lex error: {e}"),
            Self::Parse(e) => write!(f, "Parse error: {e}"),
            Self::Runtime(e) => write!(f, "Runtime error: {e}"),
        }
    }
}

impl std::error::Error for LangError {}

impl From<LexError> for LangError {
    fn from(e: LexError) -> Self {
        Self::Lex(e)
    }
}

impl From<ParseError> for LangError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<RuntimeError> for LangError {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}
