use std::rc::Rc;

use bigdecimal::BigDecimal;

use crate::{
    ast::{Expr, Lambda, Pattern, SECTION_BINDER},
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind},
        parser::{
            combinators::{lazy, many, many_at_least, BoxedParser},
            options::OptionsHandle,
            shunting_yard::{self, Op, OpList},
            stream::TokenStream,
        },
    },
};

/// The full expression grammar.
///
/// `expression := lambda | infix`. Lambdas go first: `x y. body` shares its
/// first tokens with an application, and only the `.` after the parameters
/// decides. The attempt is free because failed parsers consume nothing.
pub fn expression(options: &OptionsHandle) -> BoxedParser<Expr> {
    lambda(options).or(infix(options))
}

/// `lambda := param+ "." expression`
///
/// Multi-parameter syntax desugars here: `a b c. body` builds
/// `a. (b. (c. body))`, computing captured names innermost-first.
fn lambda(options: &OptionsHandle) -> BoxedParser<Expr> {
    let body = deferred_expression(options).or_bail("Expected a function body after '.'");

    many_at_least(1, param(), "Expected a parameter")
        .neht(kind(TokenKind::Dot))
        .pair(body)
        .map(|(params, body)| {
            params.into_iter().rev().fold(body, |body, param| {
                                         Expr::Lam(Rc::new(Lambda::new(param, body)))
                                     })
        })
}

/// `param := name | op | "{" param_entry,* "}"`
fn param() -> BoxedParser<Pattern> {
    name_or_op().map(Pattern::Single).or(param_table())
}

/// `param_entry := (name|op) ":" param | (name|op)` — the second form is
/// the shorthand `k` for `k: k`.
fn param_table() -> BoxedParser<Pattern> {
    let entry = name_or_op().pair(kind(TokenKind::Col).then(lazy(param)).maybe())
                            .map(|(key, sub)| match sub {
                                Some(pattern) => (key, pattern),
                                None => (key.clone(), Pattern::Single(key)),
                            });

    // No bailing on the closing brace here: a failed table pattern must
    // stay recoverable so `{x: 1}` can be retried as a table literal.
    kind(TokenKind::Lbr).then(comma_separated(entry))
                        .neht(kind(TokenKind::Rbr))
                        .map(Pattern::Table)
}

/// `infix := application (infix_op application)*`
///
/// The chain is collected flat and resolved immediately by the shunting
/// yard against the options as they are at this very parse, so rebinding a
/// priority affects the next expression without rebuilding any parser.
fn infix(options: &OptionsHandle) -> BoxedParser<Expr> {
    let handle = Rc::clone(options);
    let operand = application(options);
    let chunk =
        infix_op(options).pair(operand.clone()
                                      .or_bail("Expected an expression after the operator"));

    operand.pair(many(chunk)).map(move |(initial, chunks)| {
                                 shunting_yard::resolve(OpList { initial, chunks },
                                                        &handle.borrow())
                             })
}

/// `application := atomic+` — left-associative, curried.
fn application(options: &OptionsHandle) -> BoxedParser<Expr> {
    many_at_least(1, atomic(options), "Expected an expression").map(|atoms| {
        let mut atoms = atoms.into_iter();
        let first = match atoms.next() {
            Some(expr) => expr,
            None => unreachable!(),
        };
        atoms.fold(first, |fun, arg| Expr::App { fun: Box::new(fun),
                                                 arg: Box::new(arg), })
    })
}

/// `infix_op := op | "`" expression "`"`
fn infix_op(options: &OptionsHandle) -> BoxedParser<Op> {
    let quoted = kind(TokenKind::Backtick)
        .then(deferred_expression(options).or_bail("Expected an expression after '`'"))
        .neht(kind(TokenKind::Backtick).or_bail("Unclosed '`' around an operator expression"))
        .map(Op::Expr);

    kind(TokenKind::Op).map(|token| Op::Infix(token.text)).or(quoted)
}

/// `atomic := dec | str | symbol | cond | name | table | "(" … ")"`
fn atomic(options: &OptionsHandle) -> BoxedParser<Expr> {
    dec_literal().or(string_literal())
                 .or(symbol())
                 .or(cond(options))
                 .or(name_expr())
                 .or(table_literal(options))
                 .or(parenthesized(options))
}

fn dec_literal() -> BoxedParser<Expr> {
    BoxedParser::new(|input: &TokenStream| match input.advance() {
        Some((token, rest)) if token.kind == TokenKind::Dec => {
            match token.text.parse::<BigDecimal>() {
                Ok(dec) => Ok((Expr::Dec(dec), rest)),
                Err(_) => Err(ParseError::fatal(format!("'{}' is not a valid number",
                                                        token.text))),
            }
        },
        _ => Err(expected("a number", input)),
    })
}

fn string_literal() -> BoxedParser<Expr> {
    BoxedParser::new(|input: &TokenStream| match input.advance() {
        Some((token, rest))
            if token.kind == TokenKind::String1 || token.kind == TokenKind::String2 =>
        {
            Ok((Expr::Str(unescape(&token.text)), rest))
        },
        _ => Err(expected("a string", input)),
    })
}

/// `symbol := ":" (name | op)`
fn symbol() -> BoxedParser<Expr> {
    kind(TokenKind::Col).then(name_or_op().or_bail("Expected a name or operator after ':'"))
                        .map(Expr::Symbol)
}

fn name_expr() -> BoxedParser<Expr> {
    kind(TokenKind::Name).map(|token| Expr::Name(token.text))
}

/// `cond := "if" expression "then" expression "else" expression`
///
/// Everything after the `if` keyword is committed; a missing piece is a
/// hard error with a message naming the piece.
fn cond(options: &OptionsHandle) -> BoxedParser<Expr> {
    let test = deferred_expression(options).or_bail("Expected a condition after 'if'");
    let then_branch = kind(TokenKind::Then).or_bail("Expected 'then' after the condition")
                                           .then(deferred_expression(options)
                                               .or_bail("Expected an expression after 'then'"));
    let else_branch = kind(TokenKind::Else).or_bail("Expected 'else' to complete the conditional")
                                           .then(deferred_expression(options)
                                               .or_bail("Expected an expression after 'else'"));

    kind(TokenKind::If).then(test)
                       .pair(then_branch)
                       .pair(else_branch)
                       .map(|((test, then_branch), else_branch)| Expr::Cond {
                           test:        Box::new(test),
                           then_branch: Box::new(then_branch),
                           else_branch: Box::new(else_branch),
                       })
}

/// `table := "{" (entry ("," entry)* ","?)? "}"` with
/// `entry := (name|op) ":" expression | (name|op)`.
fn table_literal(options: &OptionsHandle) -> BoxedParser<Expr> {
    let entry = name_or_op().pair(kind(TokenKind::Col).then(deferred_expression(options))
                                                      .maybe())
                            .map(|(key, value)| match value {
                                Some(expr) => (key, expr),
                                None => (key.clone(), Expr::Name(key)),
                            });

    kind(TokenKind::Lbr).then(comma_separated(entry))
                        .neht(kind(TokenKind::Rbr).or_bail("Unclosed '{' in table literal"))
                        .map(Expr::Table)
}

/// Everything introduced by `(`: operator sections, then plain grouping.
///
/// ```text
/// op_section := "(" infix_op atomic ")"     -- left section
///             | "(" atomic infix_op ")"     -- right section
///             | "(" infix_op ")"            -- bare operator
/// ```
fn parenthesized(options: &OptionsHandle) -> BoxedParser<Expr> {
    let deferred_atomic = {
        let handle = Rc::clone(options);
        lazy(move || atomic(&handle))
    };

    // (⊕ e) desugars to the lambda `_. _ ⊕ e`.
    let left_section = kind(TokenKind::Lp).then(infix_op(options))
                                          .pair(deferred_atomic.clone())
                                          .neht(kind(TokenKind::Rp))
                                          .map(|(op, operand)| desugar_left_section(op, operand));

    // (e ⊕) is the partial application `(⊕) e`.
    let right_section =
        kind(TokenKind::Lp).then(deferred_atomic)
                           .pair(infix_op(options))
                           .neht(kind(TokenKind::Rp))
                           .map(|(operand, op)| Expr::App { fun: Box::new(op_callee(op)),
                                                            arg: Box::new(operand), });

    // (⊕) is the operator as a plain value.
    let bare_op = kind(TokenKind::Lp).then(infix_op(options))
                                     .neht(kind(TokenKind::Rp))
                                     .map(op_callee);

    let grouped = kind(TokenKind::Lp).then(deferred_expression(options))
                                     .neht(kind(TokenKind::Rp).or_bail("Unclosed '('"));

    left_section.or(right_section).or(bare_op).or(grouped)
}

/// The callee an operator occurrence stands for.
fn op_callee(op: Op) -> Expr {
    match op {
        Op::Infix(name) => Expr::Name(name),
        Op::Expr(expr) => expr,
    }
}

fn desugar_left_section(op: Op, operand: Expr) -> Expr {
    let hole = Expr::Name(SECTION_BINDER.to_string());
    let body = Expr::App { fun: Box::new(Expr::App { fun: Box::new(op_callee(op)),
                                                     arg: Box::new(hole), }),
                           arg: Box::new(operand), };
    Expr::Lam(Rc::new(Lambda::new(Pattern::Single(SECTION_BINDER.to_string()), body)))
}

/// `expression`, deferred so mutually recursive productions can reference
/// it without recursing at construction time.
fn deferred_expression(options: &OptionsHandle) -> BoxedParser<Expr> {
    let handle = Rc::clone(options);
    lazy(move || expression(&handle))
}

/// Zero or more comma-separated items with an optional trailing comma.
fn comma_separated<T: 'static>(item: BoxedParser<T>) -> BoxedParser<Vec<T>> {
    item.clone()
        .pair(many(kind(TokenKind::Comma).then(item)))
        .neht(kind(TokenKind::Comma).maybe())
        .map(|(first, rest)| {
            let mut items = vec![first];
            items.extend(rest);
            items
        })
        .maybe()
        .map(Option::unwrap_or_default)
}

/// Matches one token of the given kind.
fn kind(kind: TokenKind) -> BoxedParser<Token> {
    BoxedParser::new(move |input: &TokenStream| match input.advance() {
        Some((token, rest)) if token.kind == kind => Ok((token, rest)),
        _ => Err(expected(describe_kind(kind), input)),
    })
}

/// Matches a name or operator token and yields its text. Table keys,
/// symbols and parameters all accept both.
fn name_or_op() -> BoxedParser<String> {
    BoxedParser::new(|input: &TokenStream| match input.advance() {
        Some((token, rest))
            if token.kind == TokenKind::Name || token.kind == TokenKind::Op =>
        {
            Ok((token.text, rest))
        },
        _ => Err(expected("a name or operator", input)),
    })
}

fn expected(what: &str, input: &TokenStream) -> ParseError {
    ParseError::recoverable(format!("Expected {what}, found {}", input.describe_here()))
}

fn describe_kind(kind: TokenKind) -> &'static str {
    use TokenKind::{Backtick, Col, Comma, Dec, Dot, Else, If, Lbr, Lp, Name, Op, Rbr, Rp,
                    Semicolon, String1, String2, Then, Ws};
    match kind {
        If => "'if'",
        Then => "'then'",
        Else => "'else'",
        Name => "a name",
        Dec => "a number",
        Lp => "'('",
        Rp => "')'",
        Lbr => "'{'",
        Rbr => "'}'",
        Comma => "','",
        Col => "':'",
        Semicolon => "';'",
        Dot => "'.'",
        Op => "an operator",
        Backtick => "'`'",
        String1 | String2 => "a string",
        Ws => "whitespace",
    }
}

/// Decodes a raw string token (quotes included) into its value.
fn unescape(raw: &str) -> String {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {},
        }
    }
    out
}
