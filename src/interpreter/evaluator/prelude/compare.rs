use std::cmp::Ordering;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, prelude::support::binary},
        value::{core::Value, environment::EnvRef},
    },
};

/// Installs `< > <= >= ~=` on the root environment.
pub fn install(env: &EnvRef) {
    env.define("<", ordering("<", |ord| ord == Ordering::Less));
    env.define(">", ordering(">", |ord| ord == Ordering::Greater));
    env.define("<=", ordering("<=", |ord| ord != Ordering::Greater));
    env.define(">=", ordering(">=", |ord| ord != Ordering::Less));
    env.define("~=", binary("~=", |left, right, _| Ok(Value::Bool(left.weak_eq(&right)?))));
}

/// An ordering operator over quantities of equal dimension. Comparing
/// meters against seconds is as much of a mistake as adding them.
fn ordering(name: &'static str, accept: impl Fn(Ordering) -> bool + Clone + 'static) -> Value {
    binary(name, move |left, right, _| {
        let a = left.as_unit()?;
        let b = right.as_unit()?;
        if a.dim != b.dim {
            return Err(RuntimeError::DimensionMismatch { left:  a.dim,
                                                         right: b.dim, }
                                                       .into());
        }
        let ord = a.magnitude.cmp(&b.magnitude);
        Ok(Value::Bool(accept(ord)))
    })
}
