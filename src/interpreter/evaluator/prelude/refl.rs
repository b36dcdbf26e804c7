use crate::interpreter::{
    evaluator::{core::EvalResult, prelude::support::{module, native}},
    value::{
        core::{Table, Value},
        environment::EnvRef,
    },
};

/// Builds the `Refl` module.
///
/// Reflection is name-based and syntactic: `show` re-synthesises source
/// text (closures render through their lambda and its captured-name list,
/// natives through their lazy name), and `captured` walks a closure's
/// captured names through the environment it actually holds.
pub fn build() -> Value {
    module("Refl",
           vec![("kind", native("kind", |arg, _| {
                    Ok(Value::Symbol(kind_symbol(&arg).to_string()))
                })),
                ("show", native("show", |arg, _| Ok(Value::Str(arg.show())))),
                ("captured", native("captured", captured)),])
}

fn kind_symbol(value: &Value) -> &'static str {
    match value {
        Value::Str(_) => "string",
        Value::Unit(_) => "unit",
        Value::Symbol(_) => "symbol",
        Value::Bool(_) => "boolean",
        Value::Table(_) => "table",
        Value::Fun(..) => "function",
        Value::Native(_) => "native",
    }
}

/// The bindings a closure actually captured, as a table.
///
/// Natives capture through the host language, so they report an empty
/// table. A captured name can miss from the table when it is expected to
/// appear later through a top-level definition.
fn captured(arg: Value, _env: &EnvRef) -> EvalResult<Value> {
    match &arg {
        Value::Fun(lambda, closure) => {
            let mut bindings = Table::new();
            for name in &lambda.captured_names {
                if let Some(value) = closure.lookup(name) {
                    bindings.insert(name.clone(), value);
                }
            }
            Ok(Value::Table(bindings))
        },
        Value::Native(_) => Ok(Value::Table(Table::new())),
        other => Err(other.unexpected("a function").into()),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::{
        ast::{Expr, Lambda, Pattern},
        interpreter::{
            evaluator::core::{apply, interpret},
            value::{core::Unit, environment::Environment},
        },
    };

    fn entry(key: &str) -> Value {
        let env = Environment::root();
        apply(build(), Value::Symbol(key.to_string()), &env).expect("entry")
    }

    #[test]
    fn kind_names_the_variant() {
        let env = Environment::root();
        assert_eq!(apply(entry("kind"), Value::Bool(true), &env),
                   Ok(Value::Symbol("boolean".to_string())));
        assert_eq!(apply(entry("kind"), Value::Str(String::new()), &env),
                   Ok(Value::Symbol("string".to_string())));
    }

    #[test]
    fn show_renders_source_text() {
        let env = Environment::root();
        assert_eq!(apply(entry("show"), Value::Str("a".to_string()), &env),
                   Ok(Value::Str("\"a\"".to_string())));
    }

    #[test]
    fn captured_reads_through_the_closure() {
        let env = Environment::root();
        env.define("y", Value::Unit(Unit::dimensionless(5.into())));

        // x. y captures y = 5.
        let lambda = Expr::Lam(Rc::new(Lambda::new(Pattern::Single("x".to_string()),
                                                   Expr::Name("y".to_string()))));
        let fun = interpret(&lambda, &env).expect("evaluates");

        let Value::Table(bindings) = apply(entry("captured"), fun, &env).expect("captures")
        else {
            panic!("expected a table")
        };
        assert_eq!(bindings.get("y"),
                   Some(&Value::Unit(Unit::dimensionless(5.into()))));
    }
}
