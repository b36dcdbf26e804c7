use crate::interpreter::{
    evaluator::prelude::support::{module, native},
    value::core::Value,
};

/// Builds the `Sym` module: the bridge between symbols and strings.
pub fn build() -> Value {
    module("Sym",
           vec![("name", native("name", |arg, _| {
                    Ok(Value::Str(arg.as_symbol()?.to_string()))
                })),
                ("from", native("from", |arg, _| {
                    Ok(Value::Symbol(arg.as_str()?.to_string()))
                })),])
}
