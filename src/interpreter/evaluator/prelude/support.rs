use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            core::{LazyName, NativeFun, Table, Value},
            environment::EnvRef,
        },
    },
};

/// Wraps a host function as a native value.
pub fn native(name: impl Into<String>,
              fun: impl Fn(Value, &EnvRef) -> EvalResult<Value> + 'static)
              -> Value {
    Value::Native(NativeFun { name: LazyName::literal(name),
                              fun:  Rc::new(fun), })
}

/// Wraps a two-argument host function as a curried native.
///
/// The partial application renders lazily as `(name left)`; nothing is
/// formatted unless somebody prints it.
pub fn binary<F>(name: &'static str, fun: F) -> Value
    where F: Fn(Value, Value, &EnvRef) -> EvalResult<Value> + Clone + 'static
{
    native(name, move |left, _| {
        let fun = fun.clone();
        let shown = left.clone();
        Ok(Value::Native(NativeFun { name: LazyName::thunk(move || {
                                               format!("({name} {})", shown.show())
                                           }),
                                     fun:  Rc::new(move |right, env| {
                                               fun(left.clone(), right, env)
                                           }), }))
    })
}

/// Builds a module: a native that answers symbols from a fixed table.
///
/// A module behaves like a table under application but is not one, so it
/// additionally answers `:__table__` with its entries for introspection.
pub fn module(name: &'static str, entries: Vec<(&'static str, Value)>) -> Value {
    let table: Rc<Table> =
        Rc::new(entries.into_iter().map(|(key, value)| (key.to_string(), value)).collect());

    native(name, move |arg, _| match arg {
        Value::Symbol(key) if key == "__table__" => Ok(Value::Table((*table).clone())),
        Value::Symbol(key) => match table.get(&key) {
            Some(value) => Ok(value.clone()),
            None => Err(RuntimeError::MissingKey(key).into()),
        },
        other => Err(other.unexpected("a symbol").into()),
    })
}

/// The empty table, the language's stand-in for "nothing interesting".
#[must_use]
pub fn unit_value() -> Value {
    Value::Table(Table::new())
}
