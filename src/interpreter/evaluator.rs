/// Core evaluation logic.
///
/// The recursive tree walk over expressions, polymorphic application,
/// duck-typed parameter binding and the signal channel that carries errors
/// and non-local exits.
pub mod core;
/// The prelude.
///
/// Builds the root environment: arithmetic and comparison operators with
/// dimensional rules, composition and application operators, the fallback
/// combinator, definition operators, dimension constructors, and the
/// table-backed builtin modules.
pub mod prelude;
