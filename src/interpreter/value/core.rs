use std::rc::Rc;

use bigdecimal::BigDecimal;
use indexmap::IndexMap;

use crate::{
    ast::{Expr, Lambda},
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{dimension::Dimension, environment::EnvRef},
    },
};

/// An ordered map from string keys to values: the record, namespace and
/// module construct of the language. Iteration is insertion order and
/// duplicate keys overwrite in place.
pub type Table = IndexMap<String, Value>;

/// A numeric quantity: an arbitrary-precision decimal magnitude annotated
/// with an SI dimension vector. Plain numbers are dimensionless quantities.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    /// The numeric magnitude.
    pub magnitude: BigDecimal,
    /// The SI exponent vector.
    pub dim:       Dimension,
}

impl Unit {
    /// Wraps a magnitude with no dimension.
    #[must_use]
    pub fn dimensionless(magnitude: BigDecimal) -> Self {
        Self { magnitude,
               dim: Dimension::none(), }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.dim.is_none() {
            write!(f, "{}", self.magnitude.normalized())
        } else {
            write!(f, "{} {}", self.magnitude.normalized(), self.dim)
        }
    }
}

/// The name a native renders as.
///
/// Curried builtins name their partial applications lazily, so nobody pays
/// for formatting `(+ 2)` unless it is actually printed.
#[derive(Clone)]
pub enum LazyName {
    /// A fixed name, known when the native is built.
    Literal(String),
    /// A name computed on demand.
    Thunk(Rc<dyn Fn() -> String>),
}

impl LazyName {
    /// A fixed name.
    pub fn literal(name: impl Into<String>) -> Self {
        Self::Literal(name.into())
    }

    /// A name computed on demand.
    pub fn thunk(f: impl Fn() -> String + 'static) -> Self {
        Self::Thunk(Rc::new(f))
    }

    /// Produces the name, running the thunk if necessary.
    #[must_use]
    pub fn resolve(&self) -> String {
        match self {
            Self::Literal(name) => name.clone(),
            Self::Thunk(f) => f(),
        }
    }
}

impl std::fmt::Debug for LazyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resolve())
    }
}

/// A function implemented by the host rather than by a lambda.
#[derive(Clone)]
pub struct NativeFun {
    /// The display name.
    pub name: LazyName,
    /// The implementation. Receives the argument and the caller's
    /// environment.
    pub fun:  Rc<dyn Fn(Value, &EnvRef) -> EvalResult<Value>>,
}

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    /// A string.
    Str(String),
    /// A dimensioned decimal quantity.
    Unit(Unit),
    /// A symbol such as `:x`; the key currency of tables.
    Symbol(String),
    /// A boolean.
    Bool(bool),
    /// An ordered string-keyed record.
    Table(Table),
    /// A closure: a lambda plus the environment node current at its
    /// creation.
    Fun(Rc<Lambda>, EnvRef),
    /// A host-implemented function.
    Native(NativeFun),
}

impl Value {
    /// A short noun for error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "a string",
            Self::Unit(_) => "a unit",
            Self::Symbol(_) => "a symbol",
            Self::Bool(_) => "a boolean",
            Self::Table(_) => "a table",
            Self::Fun(..) => "a function",
            Self::Native(_) => "a native function",
        }
    }

    /// Extracts the boolean, or reports what was found instead.
    pub fn as_bool(&self) -> Result<bool, RuntimeError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(other.unexpected("a boolean")),
        }
    }

    /// Extracts the quantity, or reports what was found instead.
    pub fn as_unit(&self) -> Result<&Unit, RuntimeError> {
        match self {
            Self::Unit(unit) => Ok(unit),
            other => Err(other.unexpected("a unit")),
        }
    }

    /// Extracts the string, or reports what was found instead.
    pub fn as_str(&self) -> Result<&str, RuntimeError> {
        match self {
            Self::Str(text) => Ok(text),
            other => Err(other.unexpected("a string")),
        }
    }

    /// Extracts the symbol's name, or reports what was found instead.
    pub fn as_symbol(&self) -> Result<&str, RuntimeError> {
        match self {
            Self::Symbol(name) => Ok(name),
            other => Err(other.unexpected("a symbol")),
        }
    }

    /// Extracts the table, or reports what was found instead.
    pub fn as_table(&self) -> Result<&Table, RuntimeError> {
        match self {
            Self::Table(table) => Ok(table),
            other => Err(other.unexpected("a table")),
        }
    }

    /// Builds the `UnexpectedType` error for this value.
    #[must_use]
    pub fn unexpected(&self, expected: &str) -> RuntimeError {
        RuntimeError::UnexpectedType { expected: expected.to_string(),
                                       got:      self.clone(), }
    }

    /// Renders the value as source text: strings come out quoted, closures
    /// come out as their lambda syntax. This is what error messages, table
    /// entries and the REPL use.
    #[must_use]
    pub fn show(&self) -> String {
        match self {
            Self::Str(text) => Expr::Str(text.clone()).unparse(),
            Self::Unit(unit) => unit.to_string(),
            Self::Symbol(name) => format!(":{name}"),
            Self::Bool(b) => b.to_string(),
            Self::Table(table) => {
                let inner = table.iter()
                                 .map(|(key, value)| format!("{key}: {}", value.show()))
                                 .collect::<Vec<_>>()
                                 .join(", ");
                format!("{{{inner}}}")
            },
            Self::Fun(lambda, _) => Expr::Lam(Rc::clone(lambda)).unparse(),
            Self::Native(native) => native.name.resolve(),
        }
    }

    /// Structural weak equality, the meaning of `~=`.
    ///
    /// Tables compare by key set and then pointwise, so entry order never
    /// influences the result. Functions have no structural equality; asking
    /// is a domain error rather than `false`.
    ///
    /// # Errors
    /// `NotInDomain` if either side is (or contains, where compared) a
    /// function or native.
    pub fn weak_eq(&self, other: &Self) -> Result<bool, RuntimeError> {
        match (self, other) {
            (fun @ (Self::Fun(..) | Self::Native(_)), _)
            | (_, fun @ (Self::Fun(..) | Self::Native(_))) => {
                Err(RuntimeError::NotInDomain { value:       fun.clone(),
                                                explanation:
                                                    "functions have no structural equality"
                                                        .to_string(), })
            },
            (Self::Str(a), Self::Str(b)) => Ok(a == b),
            (Self::Symbol(a), Self::Symbol(b)) => Ok(a == b),
            (Self::Bool(a), Self::Bool(b)) => Ok(a == b),
            (Self::Unit(a), Self::Unit(b)) => Ok(a.magnitude == b.magnitude && a.dim == b.dim),
            (Self::Table(a), Self::Table(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (key, left) in a {
                    match b.get(key) {
                        None => return Ok(false),
                        Some(right) => {
                            if !left.weak_eq(right)? {
                                return Ok(false);
                            }
                        },
                    }
                }
                Ok(true)
            },
            _ => Ok(false),
        }
    }
}

// Closures hold their defining environment, which in turn can hold the
// closure; equality therefore compares functions by identity, never by
// structure.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Unit(a), Self::Unit(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Table(a), Self::Table(b)) => a == b,
            (Self::Fun(a, env_a), Self::Fun(b, env_b)) => {
                Rc::ptr_eq(a, b) && Rc::ptr_eq(env_a, env_b)
            },
            (Self::Native(a), Self::Native(b)) => Rc::ptr_eq(&a.fun, &b.fun),
            _ => false,
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.show())
    }
}

/// Printing, as `IO:print` and the REPL do it: strings print raw, every
/// other value prints as its source form.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(text) => write!(f, "{text}"),
            other => write!(f, "{}", other.show()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<BigDecimal> for Value {
    fn from(magnitude: BigDecimal) -> Self {
        Self::Unit(Unit::dimensionless(magnitude))
    }
}

impl From<Unit> for Value {
    fn from(unit: Unit) -> Self {
        Self::Unit(unit)
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Self::Table(table)
    }
}
