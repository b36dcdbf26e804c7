/// Represents a failure while parsing a token stream.
///
/// The `recoverable` flag is the only cross-cutting piece of error
/// information in the combinator engine: an `or` alternative masks a
/// recoverable failure and tries its other branch, while a fatal failure
/// propagates immediately so that the message attached by `or_bail` at the
/// point of commitment survives to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Human-readable description of what the parser expected.
    pub message:     String,
    /// Whether an enclosing alternative may still try another branch.
    pub recoverable: bool,
}

impl ParseError {
    /// Creates a recoverable parse error; `or` alternatives may mask it.
    pub fn recoverable(message: impl Into<String>) -> Self {
        Self { message:     message.into(),
               recoverable: true, }
    }

    /// Creates a fatal parse error; it propagates through every `or`.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self { message:     message.into(),
               recoverable: false, }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}
