use crate::interpreter::{
    evaluator::{
        core::{apply, EvalResult, Signal},
        prelude::support::{binary, module, native, unit_value},
    },
    value::{core::Value, environment::EnvRef},
};

/// Builds the `Imp` module: imperative control flow for code that wants
/// it, built on the evaluator's non-local exit signals.
///
/// The signal-raising natives (`break`, `continue`, the `return` passed by
/// `early_return`) unwind the recursive walk until the frame that
/// installed the matching catcher; nothing else in the runtime swallows
/// them, including `IO:try`.
pub fn build() -> Value {
    module("Imp",
           vec![("early_return", native("early_return", early_return)),
                ("while", support_while()),
                ("when", support_when()),
                ("chain", native("chain", chain)),
                ("break", native("break", |_, _| Err(Signal::Break))),
                ("continue", native("continue", |_, _| Err(Signal::Continue))),])
}

/// `Imp:early_return f` applies `f` to a `return` function; calling that
/// function anywhere below unwinds back here with its argument. If `f`
/// finishes without returning early, its result stands.
fn early_return(callee: Value, env: &EnvRef) -> EvalResult<Value> {
    let returner = native("return", |value, _| Err(Signal::Return(value)));
    match apply(callee, returner, env) {
        Err(Signal::Return(value)) => Ok(value),
        other => other,
    }
}

/// `Imp:while cond body`: both are callables applied to `{}` each
/// iteration. `Imp:break` leaves the loop, `Imp:continue` skips to the
/// next test. The loop itself evaluates to `{}`.
fn support_while() -> Value {
    binary("while", |cond, body, env| {
        loop {
            if !apply(cond.clone(), unit_value(), env)?.as_bool()? {
                return Ok(unit_value());
            }
            match apply(body.clone(), unit_value(), env) {
                Ok(_) | Err(Signal::Continue) => {},
                Err(Signal::Break) => return Ok(unit_value()),
                Err(other) => return Err(other),
            }
        }
    })
}

/// `Imp:when cond f`: applies `f` to `{}` when the boolean holds,
/// otherwise `{}`. The one-armed conditional for side effects.
fn support_when() -> Value {
    binary("when", |cond, callee, env| {
        if cond.as_bool()? {
            apply(callee, unit_value(), env)
        } else {
            Ok(unit_value())
        }
    })
}

/// `Imp:chain steps`: applies each entry of a table to `{}` in entry
/// order, evaluating to the last result (`{}` for an empty table).
fn chain(steps: Value, env: &EnvRef) -> EvalResult<Value> {
    let steps = steps.as_table()?.clone();
    let mut last = unit_value();
    for (_, step) in steps {
        last = apply(step, unit_value(), env)?;
    }
    Ok(last)
}
