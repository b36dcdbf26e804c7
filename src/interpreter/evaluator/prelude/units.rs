use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::prelude::support::native,
        value::{
            core::{Unit, Value},
            dimension::Dimension,
            environment::EnvRef,
        },
    },
};

/// Installs the seven dimension constructors on the root environment:
/// `seconds meters kilograms amperes kelvin moles candela`.
///
/// Each takes a dimensionless magnitude and stamps one SI base unit on it;
/// compound dimensions come from arithmetic (`meters 3 / seconds 1`).
pub fn install(env: &EnvRef) {
    env.define("seconds", constructor("seconds", Dimension::time()));
    env.define("meters", constructor("meters", Dimension::length()));
    env.define("kilograms", constructor("kilograms", Dimension::mass()));
    env.define("amperes", constructor("amperes", Dimension::current()));
    env.define("kelvin", constructor("kelvin", Dimension::temperature()));
    env.define("moles", constructor("moles", Dimension::amount()));
    env.define("candela", constructor("candela", Dimension::luminosity()));
}

fn constructor(name: &'static str, dim: Dimension) -> Value {
    native(name, move |arg, _| {
        let unit = arg.as_unit()?;
        if !unit.dim.is_none() {
            return Err(RuntimeError::NotInDomain {
                value:       arg.clone(),
                explanation: format!("{name} expects a dimensionless magnitude"),
            }.into());
        }
        Ok(Value::Unit(Unit { magnitude: unit.magnitude.clone(),
                              dim }))
    })
}
