use std::rc::Rc;

use crate::{error::ParseError, interpreter::parser::stream::TokenStream};

/// The outcome of running a parser: the parsed value plus the stream
/// positioned after whatever was consumed, or a parse error.
pub type ParseResult<T> = Result<(T, TokenStream), ParseError>;

/// A type-erased parser over a [`TokenStream`].
///
/// A parser is a pure function of its input stream: on success it returns a
/// new stream, on failure the caller still holds the original, so trying an
/// alternative is free. The only cross-cutting error information is the
/// `recoverable` flag on [`ParseError`]; `or` masks recoverable failures
/// and [`BoxedParser::or_bail`] is how a committed branch turns a generic
/// failure into a specific, user-facing message.
pub struct BoxedParser<T> {
    parser: Rc<dyn Fn(&TokenStream) -> ParseResult<T>>,
}

impl<T> Clone for BoxedParser<T> {
    fn clone(&self) -> Self {
        Self { parser: Rc::clone(&self.parser) }
    }
}

impl<T: 'static> BoxedParser<T> {
    /// Wraps a parse function.
    pub fn new(parser: impl Fn(&TokenStream) -> ParseResult<T> + 'static) -> Self {
        Self { parser: Rc::new(parser) }
    }

    /// Runs the parser on `input`.
    ///
    /// # Errors
    /// Whatever the underlying parse function reports.
    pub fn parse(&self, input: &TokenStream) -> ParseResult<T> {
        (self.parser)(input)
    }

    /// Transforms the parsed value.
    pub fn map<U: 'static>(self, f: impl Fn(T) -> U + 'static) -> BoxedParser<U> {
        BoxedParser::new(move |input| {
            let (value, rest) = self.parse(input)?;
            Ok((f(value), rest))
        })
    }

    /// Sequences a parser chosen from the parsed value.
    pub fn flat_map<U: 'static>(self, f: impl Fn(T) -> BoxedParser<U> + 'static)
                                -> BoxedParser<U> {
        BoxedParser::new(move |input| {
            let (value, rest) = self.parse(input)?;
            f(value).parse(&rest)
        })
    }

    /// Sequences `other` after this parser and keeps only its result.
    pub fn then<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<U> {
        BoxedParser::new(move |input| {
            let (_, rest) = self.parse(input)?;
            other.parse(&rest)
        })
    }

    /// Sequences `other` after this parser and keeps only this parser's
    /// result. `then` read backwards, like the data flow.
    pub fn neht<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<T> {
        BoxedParser::new(move |input| {
            let (value, rest) = self.parse(input)?;
            let (_, rest) = other.parse(&rest)?;
            Ok((value, rest))
        })
    }

    /// Sequences `other` after this parser and keeps both results.
    pub fn pair<U: 'static>(self, other: BoxedParser<U>) -> BoxedParser<(T, U)> {
        BoxedParser::new(move |input| {
            let (left, rest) = self.parse(input)?;
            let (right, rest) = other.parse(&rest)?;
            Ok(((left, right), rest))
        })
    }

    /// Tries this parser; on a recoverable failure tries `other` on the
    /// same input. An unrecoverable failure propagates immediately — that
    /// is the only way a committed branch's message survives past an
    /// enclosing alternative.
    pub fn or(self, other: BoxedParser<T>) -> BoxedParser<T> {
        BoxedParser::new(move |input| match self.parse(input) {
            Ok(success) => Ok(success),
            Err(error) if error.recoverable => other.parse(input),
            Err(error) => Err(error),
        })
    }

    /// Reinterprets a recoverable failure as unrecoverable, with `message`
    /// as the user-visible text. A failure that is already unrecoverable
    /// keeps its own, more specific message.
    pub fn or_bail(self, message: &str) -> BoxedParser<T> {
        let message = message.to_string();
        BoxedParser::new(move |input| match self.parse(input) {
            Ok(success) => Ok(success),
            Err(error) if error.recoverable => Err(ParseError::fatal(message.clone())),
            Err(error) => Err(error),
        })
    }

    /// Runs the parser but consumes nothing, succeeding or failing in
    /// place.
    pub fn look_ahead(self) -> BoxedParser<T> {
        BoxedParser::new(move |input| {
            let (value, _) = self.parse(input)?;
            Ok((value, input.clone()))
        })
    }

    /// Makes the parser optional; failure becomes `None` without consuming.
    pub fn maybe(self) -> BoxedParser<Option<T>> {
        BoxedParser::new(move |input| match self.parse(input) {
            Ok((value, rest)) => Ok((Some(value), rest)),
            Err(error) if error.recoverable => Ok((None, input.clone())),
            Err(error) => Err(error),
        })
    }
}

/// Succeeds with `value`, consuming nothing.
pub fn always<T: Clone + 'static>(value: T) -> BoxedParser<T> {
    BoxedParser::new(move |input| Ok((value.clone(), input.clone())))
}

/// Defers construction of a parser until it runs. Mutually recursive
/// grammar productions reference each other through this.
pub fn lazy<T: 'static>(thunk: impl Fn() -> BoxedParser<T> + 'static) -> BoxedParser<T> {
    BoxedParser::new(move |input| thunk().parse(input))
}

/// Applies `parser` zero or more times, collecting the results. Stops on
/// the first recoverable failure; an unrecoverable one propagates.
pub fn many<T: 'static>(parser: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    BoxedParser::new(move |input| {
        let mut results = Vec::new();
        let mut current = input.clone();
        loop {
            match parser.parse(&current) {
                Ok((value, rest)) => {
                    results.push(value);
                    current = rest;
                },
                Err(error) if error.recoverable => return Ok((results, current)),
                Err(error) => return Err(error),
            }
        }
    })
}

/// Like [`many`], but fails recoverably with `message` when fewer than `n`
/// repetitions matched.
pub fn many_at_least<T: 'static>(n: usize,
                                 parser: BoxedParser<T>,
                                 message: &str)
                                 -> BoxedParser<Vec<T>> {
    let message = message.to_string();
    let repeated = many(parser);
    BoxedParser::new(move |input| {
        let (results, rest) = repeated.parse(input)?;
        if results.len() < n {
            Err(ParseError::recoverable(format!("{message}, found {}", input.describe_here())))
        } else {
            Ok((results, rest))
        }
    })
}

/// Parses `open`, then `inner`, then `close`, keeping `inner`'s result.
pub fn surrounded_by<T: 'static, O: 'static, C: 'static>(open: BoxedParser<O>,
                                                         inner: BoxedParser<T>,
                                                         close: BoxedParser<C>)
                                                         -> BoxedParser<T> {
    open.then(inner).neht(close)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{
        lexer::{lex, Token, TokenKind},
        parser::stream::TokenStream,
    };

    fn stream(source: &str) -> TokenStream {
        TokenStream::new(lex(source).expect("lexes"))
    }

    fn token(kind: TokenKind) -> BoxedParser<Token> {
        BoxedParser::new(move |input: &TokenStream| match input.advance() {
            Some((tok, rest)) if tok.kind == kind => Ok((tok, rest)),
            _ => Err(ParseError::recoverable("expected token")),
        })
    }

    #[test]
    fn or_tries_the_second_branch_on_recoverable_failure() {
        let parser = token(TokenKind::Dec).or(token(TokenKind::Name));
        let (tok, rest) = parser.parse(&stream("x")).expect("parses");
        assert_eq!(tok.text, "x");
        assert!(rest.is_done());
    }

    #[test]
    fn or_propagates_fatal_failures_untouched() {
        let fatal = token(TokenKind::Dec).or_bail("wanted a number");
        let parser = fatal.or(token(TokenKind::Name));

        let error = parser.parse(&stream("x")).expect_err("fails");
        assert!(!error.recoverable);
        assert_eq!(error.message, "wanted a number");
    }

    #[test]
    fn or_bail_keeps_an_already_fatal_message() {
        let inner = token(TokenKind::Dec).or_bail("inner message");
        let outer = inner.or_bail("outer message");

        let error = outer.parse(&stream("x")).expect_err("fails");
        assert_eq!(error.message, "inner message");
    }

    #[test]
    fn look_ahead_consumes_nothing() {
        let parser = token(TokenKind::Name).look_ahead();
        let (tok, rest) = parser.parse(&stream("x y")).expect("parses");
        assert_eq!(tok.text, "x");
        assert_eq!(rest.position(), 0);
    }

    #[test]
    fn many_stops_without_consuming_the_failure() {
        let parser = many(token(TokenKind::Name));
        let (names, rest) = parser.parse(&stream("a b 1")).expect("parses");
        assert_eq!(names.len(), 2);
        assert_eq!(rest.position(), 2);
    }

    #[test]
    fn many_at_least_reports_too_few() {
        let parser = many_at_least(1, token(TokenKind::Name), "expected a name");
        let error = parser.parse(&stream("1")).expect_err("fails");
        assert!(error.recoverable);
        assert!(error.message.starts_with("expected a name"));
    }

    #[test]
    fn maybe_turns_failure_into_none() {
        let parser = token(TokenKind::Dec).maybe();
        let (value, rest) = parser.parse(&stream("x")).expect("parses");
        assert!(value.is_none());
        assert_eq!(rest.position(), 0);
    }

    #[test]
    fn sequencing_keeps_the_requested_side() {
        let keep_right = token(TokenKind::Name).then(token(TokenKind::Dec));
        let (tok, _) = keep_right.parse(&stream("x 1")).expect("parses");
        assert_eq!(tok.kind, TokenKind::Dec);

        let keep_left = token(TokenKind::Name).neht(token(TokenKind::Dec));
        let (tok, rest) = keep_left.parse(&stream("x 1")).expect("parses");
        assert_eq!(tok.kind, TokenKind::Name);
        assert!(rest.is_done());
    }

    #[test]
    fn surrounded_by_keeps_the_middle() {
        let parser = surrounded_by(token(TokenKind::Lp),
                                   token(TokenKind::Name),
                                   token(TokenKind::Rp));
        let (tok, rest) = parser.parse(&stream("(x)")).expect("parses");
        assert_eq!(tok.text, "x");
        assert!(rest.is_done());
    }

    #[test]
    fn always_and_lazy_are_inert_wrappers() {
        let (value, rest) = always(7).parse(&stream("x")).expect("parses");
        assert_eq!(value, 7);
        assert_eq!(rest.position(), 0);

        let deferred = lazy(|| token(TokenKind::Name));
        assert!(deferred.parse(&stream("x")).is_ok());
    }
}
