use bigdecimal::BigDecimal;

use crate::interpreter::{
    evaluator::prelude::support::{binary, module, native},
    value::core::{Table, Unit, Value},
};

/// Builds the `Str` module.
pub fn build() -> Value {
    module("Str",
           vec![("length", native("length", |arg, _| {
                    let count = arg.as_str()?.chars().count();
                    Ok(Value::Unit(Unit::dimensionless(BigDecimal::from(count as u64))))
                })),
                ("upper", text_fn("upper", |text| text.to_uppercase())),
                ("lower", text_fn("lower", |text| text.to_lowercase())),
                ("trim", text_fn("trim", |text| text.trim().to_string())),
                ("reverse", text_fn("reverse", |text| text.chars().rev().collect())),
                ("split", binary("split", |separator, text, _| {
                    let separator = separator.as_str()?.to_string();
                    let text = text.as_str()?;
                    let mut pieces = Table::new();
                    for (index, piece) in text.split(separator.as_str()).enumerate() {
                        pieces.insert(index.to_string(), Value::Str(piece.to_string()));
                    }
                    Ok(Value::Table(pieces))
                })),
                ("contains", binary("contains", |needle, text, _| {
                    Ok(Value::Bool(text.as_str()?.contains(needle.as_str()?)))
                })),
                ("from", native("from", |arg, _| Ok(Value::Str(arg.to_string())))),])
}

fn text_fn(name: &'static str, f: impl Fn(&str) -> String + 'static) -> Value {
    native(name, move |arg, _| Ok(Value::Str(f(arg.as_str()?))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{
        evaluator::core::apply,
        value::environment::Environment,
    };

    fn call(key: &str, arg: Value) -> Value {
        let env = Environment::root();
        let entry = apply(build(), Value::Symbol(key.to_string()), &env).expect("entry");
        apply(entry, arg, &env).expect("applies")
    }

    #[test]
    fn simple_transformations() {
        assert_eq!(call("upper", Value::Str("abc".to_string())),
                   Value::Str("ABC".to_string()));
        assert_eq!(call("reverse", Value::Str("abc".to_string())),
                   Value::Str("cba".to_string()));
        assert_eq!(call("trim", Value::Str("  x ".to_string())),
                   Value::Str("x".to_string()));
    }

    #[test]
    fn length_counts_characters() {
        assert_eq!(call("length", Value::Str("héllo".to_string())),
                   Value::Unit(Unit::dimensionless(5.into())));
    }

    #[test]
    fn split_yields_an_indexed_table() {
        let env = Environment::root();
        let split = apply(build(), Value::Symbol("split".to_string()), &env).expect("entry");
        let partial = apply(split, Value::Str(",".to_string()), &env).expect("applies");
        let pieces = apply(partial, Value::Str("a,b,c".to_string()), &env).expect("applies");

        let Value::Table(pieces) = pieces else {
            panic!("expected a table")
        };
        assert_eq!(pieces.get("0"), Some(&Value::Str("a".to_string())));
        assert_eq!(pieces.get("2"), Some(&Value::Str("c".to_string())));
    }

    #[test]
    fn from_renders_any_value() {
        assert_eq!(call("from", Value::Bool(true)), Value::Str("true".to_string()));
    }
}
