use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::interpreter::{
    value::{
        core::Value,
        environment::{EnvRef, Environment},
    },
    IoHandle,
};

/// Arithmetic operators over quantities, with their dimensional rules.
pub mod arith;
/// Ordering and weak-equality operators.
pub mod compare;
/// Composition, application and fallback operators, plus concatenation.
pub mod compose;
/// The `Imp` module: imperative control flow over non-local exits.
pub mod imp;
/// The `IO` module and the `.=` definition operator.
pub mod io;
/// The `Refl` module: reflection over values and closures.
pub mod refl;
/// The `Str` module: string utilities.
pub mod strings;
/// Helpers for building natives, curried natives and builtin modules.
pub mod support;
/// The `Sym` module: converting between symbols and strings.
pub mod sym;
/// Dimension constructors, one per SI base unit.
pub mod units;

/// The memoised results of `IO:import`, shared by every interpreter that
/// participates in one session so circular imports are caught across
/// module boundaries.
pub type ModuleCache = Rc<RefCell<HashMap<String, Value>>>;

/// Builds the root environment.
///
/// # Parameters
/// - `handle`: The host's I/O implementation, captured by the `IO` natives.
/// - `location`: Where this interpreter's code nominally lives; passed to
///   the host when resolving imports.
/// - `modules`: The session's shared import cache.
pub fn build(handle: &Rc<dyn IoHandle>, location: &str, modules: &ModuleCache) -> EnvRef {
    let root = Environment::root();

    arith::install(&root);
    compare::install(&root);
    compose::install(&root);
    units::install(&root);

    root.define("true", Value::Bool(true));
    root.define("false", Value::Bool(false));
    root.define(".=", io::define_op());

    root.define("IO", io::build(handle, location, modules));
    root.define("Str", strings::build());
    root.define("Sym", sym::build());
    root.define("Refl", refl::build());
    root.define("Imp", imp::build());

    root
}
