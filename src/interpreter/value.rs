/// Core runtime value representation.
///
/// Defines the `Value` enum with all runtime variants (strings, dimensioned
/// decimals, symbols, booleans, tables, closures and natives), the checked
/// accessors used throughout the prelude, rendering, and the structural
/// weak equality behind `~=`.
pub mod core;
/// SI dimension vectors.
///
/// A `Dimension` is a vector of seven exact rational exponents over the SI
/// base units. Multiplication adds exponent vectors, division subtracts
/// them, powers scale them and roots divide them; exponents stay reduced
/// because they are stored as rationals.
pub mod dimension;
/// Environments.
///
/// A chain of reference-counted nodes mapping names to values. Name maps
/// are interior-mutable so that top-level definitions become visible
/// through every closure that already captured the node.
pub mod environment;
