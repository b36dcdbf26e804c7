use crate::interpreter::value::{core::Value, dimension::Dimension};

#[derive(Debug, Clone, PartialEq)]
/// Represents all errors that can be raised during evaluation.
pub enum RuntimeError {
    /// A value had a different kind than the operation required.
    UnexpectedType {
        /// Description of the kind the operation required.
        expected: String,
        /// The value that was actually supplied.
        got:      Value,
    },
    /// A table was asked for a key it does not contain.
    MissingKey(String),
    /// A name was looked up but is bound nowhere in the environment chain.
    UndefinedName(String),
    /// Two quantities with incompatible dimensions met in an operation that
    /// requires dimensional equality.
    DimensionMismatch {
        /// Dimension of the left operand.
        left:  Dimension,
        /// Dimension of the right operand.
        right: Dimension,
    },
    /// A value was outside the domain of the operation applied to it.
    NotInDomain {
        /// The offending value.
        value:       Value,
        /// Why the value is not acceptable.
        explanation: String,
    },
    /// An arbitrary value raised by user code (see `IO:raise` / `IO:try`).
    Other(Value),
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedType { expected, got } => {
                write!(f, "Expected {expected}, but got {}.", got.show())
            },
            Self::MissingKey(key) => write!(f, "There is no entry for :{key}."),
            Self::UndefinedName(name) => write!(f, "'{name}' is not defined."),
            Self::DimensionMismatch { left, right } => write!(f,
                                                             "Dimensions do not match: {} versus {}.",
                                                             left.describe(),
                                                             right.describe()),
            Self::NotInDomain { value, explanation } => {
                write!(f, "{} is not in the domain: {explanation}.", value.show())
            },
            Self::Other(value) => write!(f, "Raised: {}.", value.show()),
        }
    }
}

impl std::error::Error for RuntimeError {}
