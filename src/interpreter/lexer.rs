use logos::Logos;

use crate::error::LexError;

/// The kind of a lexical token.
///
/// Recognition is longest-match over these patterns in one pass. The
/// orderings the grammar depends on all fall out of longest-match plus
/// priorities: `iffy` is a name while `if` is a keyword, `-1` is a decimal
/// while `- 1` is an operator and a decimal, and `.` is a lambda dot unless
/// it runs together with other operator characters (`..`, `.=`).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `if`
    #[token("if")]
    If,
    /// `then`
    #[token("then")]
    Then,
    /// `else`
    #[token("else")]
    Else,
    /// An identifier. `?` and `!` may trail an identifier but not start
    /// one; `upper?` and `not!` are single names.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*[?!]*")]
    Name,
    /// A decimal literal with optional leading `-`, fraction and exponent.
    /// Only `-` can lead; a binary minus disambiguates through operator
    /// context instead.
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Dec,
    /// `(`
    #[token("(")]
    Lp,
    /// `)`
    #[token(")")]
    Rp,
    /// `{`
    #[token("{")]
    Lbr,
    /// `}`
    #[token("}")]
    Rbr,
    /// `,`
    #[token(",")]
    Comma,
    /// `:`
    #[token(":")]
    Col,
    /// `;`
    #[token(";")]
    Semicolon,
    /// A lambda dot: `.` not running together with operator characters.
    #[token(".", priority = 10)]
    Dot,
    /// A run of operator characters, e.g. `+`, `<=`, `.=`, `|?`.
    #[regex(r"[-+=*/%!|&^$><?.]+")]
    Op,
    /// `` ` ``
    #[token("`")]
    Backtick,
    /// A single-quoted string literal with backslash escapes.
    #[regex(r"'([^'\\]|\\.)*'")]
    String1,
    /// A double-quoted string literal with backslash escapes.
    #[regex(r#""([^"\\]|\\.)*""#)]
    String2,
    /// Whitespace or a `#` comment running to the end of the line. Dropped
    /// by default; kept when the caller asks for trivia.
    #[regex(r"[ \t\r\n\f]+")]
    #[regex(r"#[^\n]*")]
    Ws,
}

/// A lexical token: its kind, byte offset and raw source text.
///
/// Concatenating the `text` of every token (trivia included) reproduces the
/// source exactly; the lexer neither decodes escapes nor normalises
/// numbers. That happens when the parser builds AST nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What was recognised.
    pub kind:   TokenKind,
    /// Byte offset of the first character in the source.
    pub offset: usize,
    /// The raw matched text.
    pub text:   String,
}

/// Tokenizes `source`, dropping whitespace and comments.
///
/// # Errors
/// Returns a `LexError` citing the first run of characters no pattern
/// matches; no tokens are produced in that case.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Ok(lex_with_trivia(source)?.into_iter()
                               .filter(|token| token.kind != TokenKind::Ws)
                               .collect())
}

/// Tokenizes `source`, keeping whitespace and comment tokens.
///
/// Syntax highlighters want the full stream; everything else goes through
/// [`lex`].
///
/// # Errors
/// Returns a `LexError` citing the first run of characters no pattern
/// matches; no tokens are produced in that case.
pub fn lex_with_trivia(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(kind) => tokens.push(Token { kind,
                                            offset: span.start,
                                            text: lexer.slice().to_string(), }),
            Err(()) => {
                // Extend over the whole contiguous unmatchable run so the
                // message cites it in one piece.
                let start = span.start;
                let mut end = span.end;
                while let Some(Err(())) = lexer.next() {
                    if lexer.span().start != end {
                        break;
                    }
                    end = lexer.span().end;
                }
                return Err(LexError { slice:  source[start..end].to_string(),
                                      offset: start, });
            },
        }
    }

    Ok(tokens)
}
