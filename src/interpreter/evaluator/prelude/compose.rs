use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{apply, EvalResult, Signal},
            prelude::support::binary,
        },
        value::{
            core::{LazyName, NativeFun, Value},
            environment::EnvRef,
        },
    },
};

/// Installs `++ << >> |> $ |?` (and its spelled-out alias `fallback`) on
/// the root environment.
pub fn install(env: &EnvRef) {
    env.define("++", binary("++", concat));
    env.define("<<", binary("<<", compose_after));
    env.define(">>", binary(">>", compose_then));
    env.define("|>", binary("|>", |value, fun, env| apply(fun, value, env)));
    env.define("$", binary("$", apply));
    let fallback = binary("|?", fallback);
    env.define("|?", fallback.clone());
    env.define("fallback", fallback);
}

/// String concatenation.
fn concat(left: Value, right: Value, _env: &EnvRef) -> EvalResult<Value> {
    let mut text = left.as_str()?.to_string();
    text.push_str(right.as_str()?);
    Ok(Value::Str(text))
}

/// `(f << g) x` is `f (g x)`.
fn compose_after(f: Value, g: Value, _env: &EnvRef) -> EvalResult<Value> {
    Ok(composed(f, g, "<<", |f, g, x, env| {
        let mid = apply(g.clone(), x, env)?;
        apply(f.clone(), mid, env)
    }))
}

/// `(f >> g) x` is `g (f x)`: the left function runs first.
fn compose_then(f: Value, g: Value, _env: &EnvRef) -> EvalResult<Value> {
    Ok(composed(f, g, ">>", |f, g, x, env| {
        let mid = apply(f.clone(), x, env)?;
        apply(g.clone(), mid, env)
    }))
}

fn composed(f: Value,
            g: Value,
            op: &'static str,
            run: impl Fn(&Value, &Value, Value, &EnvRef) -> EvalResult<Value> + 'static)
            -> Value {
    let (name_f, name_g) = (f.clone(), g.clone());
    Value::Native(NativeFun { name: LazyName::thunk(move || {
                                        format!("({} {op} {})", name_f.show(), name_g.show())
                                    }),
                              fun:  Rc::new(move |x, env| run(&f, &g, x, env)), })
}

/// The `|?` combinator: a callee that tries its first target and falls
/// back to the second when — and only when — the first fails with a
/// missing key. Every other failure propagates untouched.
fn fallback(first: Value, second: Value, _env: &EnvRef) -> EvalResult<Value> {
    let (name_first, name_second) = (first.clone(), second.clone());
    Ok(Value::Native(NativeFun { name: LazyName::thunk(move || {
                                           format!("({} |? {})",
                                                   name_first.show(),
                                                   name_second.show())
                                       }),
                                 fun:  Rc::new(move |arg, env| {
                                           match apply(first.clone(), arg.clone(), env) {
                                               Err(Signal::Error(
                                                   RuntimeError::MissingKey(_),
                                               )) => apply(second.clone(), arg, env),
                                               other => other,
                                           }
                                       }), }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::value::{
        core::{Table, Unit},
        environment::Environment,
    };

    fn env() -> EnvRef {
        let env = Environment::root();
        install(&env);
        env
    }

    fn dec(text: &str) -> Value {
        Value::Unit(Unit::dimensionless(text.parse().expect("decimal")))
    }

    fn table(entries: &[(&str, Value)]) -> Value {
        Value::Table(entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    fn run(env: &EnvRef, op: &str, left: Value, right: Value) -> EvalResult<Value> {
        let callee = env.lookup(op).expect("operator");
        let partial = apply(callee, left, env)?;
        apply(partial, right, env)
    }

    #[test]
    fn concat_joins_strings_only() {
        let env = env();
        assert_eq!(run(&env,
                       "++",
                       Value::Str("hello ".to_string()),
                       Value::Str("world".to_string())),
                   Ok(Value::Str("hello world".to_string())));
        assert!(run(&env, "++", Value::Str("x".to_string()), dec("1")).is_err());
    }

    #[test]
    fn fallback_catches_missing_keys_only() {
        let env = env();
        let primary = table(&[("x", dec("1"))]);
        let secondary = table(&[("y", dec("2"))]);

        let combined = run(&env, "|?", primary, secondary).expect("combines");
        assert_eq!(apply(combined.clone(), Value::Symbol("y".to_string()), &env),
                   Ok(dec("2")));
        assert_eq!(apply(combined.clone(), Value::Symbol("x".to_string()), &env),
                   Ok(dec("1")));

        // A non-symbol argument raises UnexpectedType in the primary; |?
        // must not mask that.
        assert!(matches!(apply(combined, dec("3"), &env),
                         Err(Signal::Error(RuntimeError::UnexpectedType { .. }))));
    }

    #[test]
    fn fallback_has_a_spelled_out_alias() {
        let env = env();
        let a = table(&[("x", dec("1"))]);
        let b = Value::Table(Table::new());
        assert!(run(&env, "fallback", a, b).is_ok());
    }

    #[test]
    fn pipes_apply_their_function() {
        let env = env();
        let first = table(&[("k", dec("9"))]);
        assert_eq!(run(&env, "|>", Value::Symbol("k".to_string()), first.clone()),
                   Ok(dec("9"))); // value |> fun applies fun — here a table lookup.
        assert_eq!(run(&env, "$", first, Value::Symbol("k".to_string())), Ok(dec("9")));
    }
}
