use std::rc::Rc;

use crate::interpreter::lexer::Token;

/// An immutable cursor into a shared token vector.
///
/// Advancing returns a fresh stream rather than mutating; parsers hand the
/// original stream back on failure, which is the entire backtracking story
/// of the combinator engine. Cloning is an `Rc` bump plus an offset copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Rc<Vec<Token>>,
    offset: usize,
}

impl TokenStream {
    /// Wraps a token vector in a stream positioned at the start.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens: Rc::new(tokens),
               offset: 0, }
    }

    /// True when every token has been consumed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.offset >= self.tokens.len()
    }

    /// The token under the cursor, if any.
    #[must_use]
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.offset)
    }

    /// The token under the cursor plus the stream positioned after it.
    #[must_use]
    pub fn advance(&self) -> Option<(Token, Self)> {
        self.tokens.get(self.offset).map(|token| {
                                        (token.clone(),
                                         Self { tokens: Rc::clone(&self.tokens),
                                                offset: self.offset + 1, })
                                    })
    }

    /// The index of the cursor, in tokens.
    #[must_use]
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Renders the current position for error messages.
    #[must_use]
    pub fn describe_here(&self) -> String {
        match self.peek() {
            Some(token) => format!("'{}'", token.text),
            None => "the end of the input".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::lexer::lex;

    #[test]
    fn advancing_leaves_the_original_untouched() {
        let stream = TokenStream::new(lex("a b").expect("lexes"));
        let (first, rest) = stream.advance().expect("token");

        assert_eq!(first.text, "a");
        assert_eq!(stream.position(), 0);
        assert_eq!(rest.position(), 1);

        let (second, rest) = rest.advance().expect("token");
        assert_eq!(second.text, "b");
        assert!(rest.is_done());
        assert!(rest.advance().is_none());
    }
}
