use std::rc::Rc;

use bigdecimal::BigDecimal;

/// The name of the synthetic binder introduced when a left operator section
/// is desugared to a lambda. The unparser recognises this binder to print
/// the section back in its surface form.
pub const SECTION_BINDER: &str = "_";

/// An abstract syntax tree node representing an expression.
///
/// `Expr` covers every construct of the surface language. Application is
/// binary and curried: `f x y` is `App(App(f, x), y)`. Infix operators do
/// not survive parsing; the shunting-yard resolver rewrites them into plain
/// applications of the operator's name.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a binding by name. Operator names such as `+` also
    /// appear here once the shunting yard has resolved them.
    Name(String),
    /// An arbitrary-precision decimal literal.
    Dec(BigDecimal),
    /// A string literal, with escape sequences already decoded.
    Str(String),
    /// A symbol literal such as `:x` or `:+`.
    Symbol(String),
    /// A table literal: an ordered sequence of key/value entries.
    /// Duplicate keys are legal and overwrite in entry order at evaluation.
    Table(Vec<(String, Expr)>),
    /// Application of a function-like value to exactly one argument.
    App {
        /// The callee expression.
        fun: Box<Expr>,
        /// The argument expression.
        arg: Box<Expr>,
    },
    /// Conditional expression: `if test then … else …`.
    Cond {
        /// The condition; must evaluate to a boolean.
        test:        Box<Expr>,
        /// Expression evaluated when the condition holds.
        then_branch: Box<Expr>,
        /// Expression evaluated when the condition does not hold.
        else_branch: Box<Expr>,
    },
    /// A lambda literal. Multi-parameter surface syntax desugars to nested
    /// single-parameter lambdas before this node is built.
    Lam(Rc<Lambda>),
}

/// A single-parameter function literal.
///
/// `captured_names` lists the free names of `body` that are not bound by
/// `param`, deduplicated in first-occurrence order. The reflective
/// pretty-printer uses it to render closures without walking environments.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    /// The parameter pattern.
    pub param:          Pattern,
    /// The function body.
    pub body:           Expr,
    /// Free names of `body` minus the names bound by `param`.
    pub captured_names: Vec<String>,
}

impl Lambda {
    /// Builds a lambda, computing its captured names.
    ///
    /// Nested lambdas are treated opaquely through their already-computed
    /// `captured_names`, so construction is linear in the body and the
    /// analysis never re-traverses inner function bodies.
    pub fn new(param: Pattern, body: Expr) -> Self {
        let mut free = Vec::new();
        body.free_names(&mut free);

        let mut bound = Vec::new();
        param.bound_names(&mut bound);

        let captured_names = free.into_iter().filter(|name| !bound.contains(name)).collect();
        Self { param,
               body,
               captured_names }
    }
}

/// A lambda parameter pattern.
///
/// A table pattern destructures duck-typed: the runtime applies the argument
/// to each key as a symbol and recursively binds whatever comes back, so it
/// works against literal tables, modules and user functions alike.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Bind the whole argument to one name.
    Single(String),
    /// Extract each key from the argument and bind the sub-pattern to it.
    Table(Vec<(String, Pattern)>),
}

impl Pattern {
    /// Appends every name this pattern binds to `acc`.
    pub fn bound_names(&self, acc: &mut Vec<String>) {
        match self {
            Self::Single(name) => acc.push(name.clone()),
            Self::Table(entries) => {
                for (_, sub) in entries {
                    sub.bound_names(acc);
                }
            },
        }
    }

    fn unparse(&self) -> String {
        match self {
            Self::Single(name) => name.clone(),
            Self::Table(entries) => {
                let inner = entries.iter()
                                   .map(|(key, sub)| match sub {
                                       // Shorthand `k` stands for `k: k`.
                                       Self::Single(name) if name == key => key.clone(),
                                       other => format!("{key}: {}", other.unparse()),
                                   })
                                   .collect::<Vec<_>>()
                                   .join(", ");
                format!("{{{inner}}}")
            },
        }
    }
}

impl Expr {
    /// Appends the free names of this expression to `acc`, deduplicated in
    /// first-occurrence order.
    pub fn free_names(&self, acc: &mut Vec<String>) {
        match self {
            Self::Name(name) => {
                if !acc.contains(name) {
                    acc.push(name.clone());
                }
            },
            Self::Dec(_) | Self::Str(_) | Self::Symbol(_) => {},
            Self::Table(entries) => {
                for (_, value) in entries {
                    value.free_names(acc);
                }
            },
            Self::App { fun, arg } => {
                fun.free_names(acc);
                arg.free_names(acc);
            },
            Self::Cond { test,
                         then_branch,
                         else_branch, } => {
                test.free_names(acc);
                then_branch.free_names(acc);
                else_branch.free_names(acc);
            },
            Self::Lam(lambda) => {
                for name in &lambda.captured_names {
                    if !acc.contains(name) {
                        acc.push(name.clone());
                    }
                }
            },
        }
    }

    /// True for expressions that parentheses leave unchanged: names,
    /// literals, symbols and tables.
    pub fn is_atomic(&self) -> bool {
        matches!(self,
                 Self::Name(_) | Self::Dec(_) | Self::Str(_) | Self::Symbol(_) | Self::Table(_))
    }

    /// Re-synthesises surface syntax for this expression.
    ///
    /// The rendering is purely syntactic: nested lambdas re-associate into
    /// `a b c. body`, the synthetic left-section shape prints as `(⊕ e)`,
    /// and resolved infix applications print back in infix position. No
    /// attempt is made to reverse evaluation.
    pub fn unparse(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Dec(dec) => dec.normalized().to_string(),
            Self::Str(text) => quote(text),
            Self::Symbol(name) => format!(":{name}"),
            Self::Table(entries) => {
                let inner = entries.iter()
                                   .map(|(key, value)| format!("{key}: {}", value.unparse()))
                                   .collect::<Vec<_>>()
                                   .join(", ");
                format!("{{{inner}}}")
            },
            Self::App { .. } => self.unparse_application(),
            Self::Cond { test,
                         then_branch,
                         else_branch, } => format!("if {} then {} else {}",
                                                   test.unparse(),
                                                   then_branch.unparse(),
                                                   else_branch.unparse()),
            Self::Lam(lambda) => unparse_lambda(lambda),
        }
    }

    fn unparse_application(&self) -> String {
        // `l ⊕ r` survives as App(App(Name(⊕), l), r); print it back infix.
        if let Self::App { fun, arg: right } = self {
            if let Self::App { fun: op, arg: left } = fun.as_ref() {
                if let Self::Name(name) = op.as_ref() {
                    if is_operator_name(name) {
                        return format!("{} {name} {}",
                                       left.unparse_operand(),
                                       right.unparse_operand());
                    }
                }
            }
        }

        // Plain application chain: flatten the spine, one operand at a time.
        let mut spine = Vec::new();
        let mut head = self;
        while let Self::App { fun, arg } = head {
            spine.push(arg.as_ref());
            head = fun;
        }
        spine.push(head);
        spine.reverse();

        spine.iter().map(|part| part.unparse_operand()).collect::<Vec<_>>().join(" ")
    }

    /// Like `unparse`, but wraps anything non-atomic in parentheses so the
    /// result can stand as an application operand.
    fn unparse_operand(&self) -> String {
        if self.is_atomic() {
            self.unparse()
        } else {
            format!("({})", self.unparse())
        }
    }
}

fn unparse_lambda(lambda: &Lambda) -> String {
    if let Some(section) = unparse_left_section(lambda) {
        return section;
    }

    // Re-associate `a. (b. (c. body))` into `a b c. body`.
    let mut params = vec![lambda.param.unparse()];
    let mut body = &lambda.body;
    while let Expr::Lam(inner) = body {
        params.push(inner.param.unparse());
        body = &inner.body;
    }

    format!("{}. {}", params.join(" "), body.unparse())
}

/// Recognises the desugared left operator section `_. _ ⊕ e` and prints it
/// as `(⊕ e)`.
fn unparse_left_section(lambda: &Lambda) -> Option<String> {
    let binder = match &lambda.param {
        Pattern::Single(name) if name == SECTION_BINDER => name,
        _ => return None,
    };

    if let Expr::App { fun, arg: right } = &lambda.body {
        if let Expr::App { fun: op, arg: left } = fun.as_ref() {
            if matches!(left.as_ref(), Expr::Name(name) if name == binder) {
                let op_text = match op.as_ref() {
                    Expr::Name(name) if is_operator_name(name) => name.clone(),
                    Expr::Name(_) => return None,
                    other => format!("`{}`", other.unparse()),
                };
                return Some(format!("({op_text} {})", right.unparse_operand()));
            }
        }
    }
    None
}

/// True when a name is spelled entirely from operator characters, meaning
/// it must have come from an infix position or an operator section.
pub fn is_operator_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| "-+=*/%!|&^$><?.".contains(c))
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
