/// Represents a failure to tokenize the source text.
///
/// The tokenizer advances by longest match over a fixed set of patterns; if
/// no pattern matches at some position, the whole run of unmatchable
/// characters is reported as one error and no tokens are produced at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// The slice of source text that could not be tokenized.
    pub slice:  String,
    /// Byte offset of the start of the unmatched run.
    pub offset: usize,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "I don't understand: {}", self.slice)
    }
}

impl std::error::Error for LexError {}
