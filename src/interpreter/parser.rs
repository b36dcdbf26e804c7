use crate::{
    ast::Expr,
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            combinators::{BoxedParser, ParseResult},
            options::{default_options, OptionsHandle},
            stream::TokenStream,
        },
    },
};

/// The combinator engine.
///
/// A tiny parser library over token streams: sequencing, choice,
/// recoverable-versus-fatal failure, repetition and deferral. Nothing in it
/// knows the expression grammar.
pub mod combinators;
/// The expression grammar.
///
/// Builds expressions, lambdas, tables, conditionals and operator sections
/// out of the combinator engine, collecting infix chains for the shunting
/// yard to resolve.
pub mod grammar;
/// Operator tables.
///
/// `ParseOptions` maps operator names to priorities and lives behind a
/// shared handle so hosts can rebind precedences between expressions.
pub mod options;
/// Infix resolution.
///
/// Dijkstra's shunting yard, turning a flat operator chain into an
/// application tree under the current operator table.
pub mod shunting_yard;
/// The immutable token cursor parsers run on.
pub mod stream;

/// The expression parser a host holds on to.
///
/// Carries the shared [`options::ParseOptions`] handle; every parse
/// dereferences the handle afresh, so priority changes made through
/// [`ExprParser::options`] apply to the next expression parsed.
pub struct ExprParser {
    options: OptionsHandle,
}

impl ExprParser {
    /// Creates a parser over the default operator table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(default_options())
    }

    /// Creates a parser sharing an existing operator table.
    #[must_use]
    pub fn with_options(options: OptionsHandle) -> Self {
        Self { options }
    }

    /// The shared operator table handle. Mutating it affects every later
    /// parse made through this parser.
    #[must_use]
    pub fn options(&self) -> OptionsHandle {
        OptionsHandle::clone(&self.options)
    }

    /// Parses one expression (with its optional trailing `;`) off the
    /// front of `input`, returning it with the remaining stream.
    ///
    /// # Errors
    /// A `ParseError` when no expression starts at the cursor, or when a
    /// committed construct is incomplete.
    pub fn parse_expression(&self, input: &TokenStream) -> ParseResult<Expr> {
        use crate::interpreter::lexer::TokenKind;

        let semicolon = BoxedParser::new(|input: &TokenStream| match input.advance() {
            Some((token, rest)) if token.kind == TokenKind::Semicolon => Ok(((), rest)),
            _ => Err(ParseError::recoverable("Expected ';'")),
        });

        grammar::expression(&self.options).neht(semicolon.maybe()).parse(input)
    }

    /// Parses exactly one expression; leftover tokens are an error.
    ///
    /// # Errors
    /// A `ParseError` if the tokens do not form a single expression.
    pub fn parse_one(&self, tokens: Vec<Token>) -> Result<Expr, ParseError> {
        let (expr, rest) = self.parse_expression(&TokenStream::new(tokens))?;
        if rest.is_done() {
            Ok(expr)
        } else {
            Err(ParseError::fatal(format!("Unexpected input after the expression: {}",
                                          rest.describe_here())))
        }
    }

    /// Parses expressions until the stream is exhausted.
    ///
    /// This is the script and REPL entry point: any number of expressions,
    /// each optionally terminated by `;`.
    ///
    /// # Errors
    /// The first `ParseError` encountered; nothing partial is returned.
    pub fn parse_multiline(&self, tokens: Vec<Token>) -> Result<Vec<Expr>, ParseError> {
        let mut stream = TokenStream::new(tokens);
        let mut exprs = Vec::new();
        while !stream.is_done() {
            let (expr, rest) = self.parse_expression(&stream)?;
            exprs.push(expr);
            stream = rest;
        }
        Ok(exprs)
    }
}

impl Default for ExprParser {
    fn default() -> Self {
        Self::new()
    }
}
