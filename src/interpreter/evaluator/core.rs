use std::rc::Rc;

use crate::{
    ast::{Expr, Pattern},
    error::RuntimeError,
    interpreter::value::{
        core::{Table, Unit, Value},
        environment::{EnvRef, Environment},
    },
};

/// What travels down the evaluator's failure channel.
///
/// Errors are the common case. The other three variants are the non-local
/// exits behind `Imp:early_return`, `Imp:break` and `Imp:continue`: tagged
/// sentinels that unwind the recursive walk until the native frame that
/// installed them catches them. They are not errors, and nothing but their
/// installing frames (and the host boundary, which rejects strays) may
/// swallow them.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// A genuine runtime error.
    Error(RuntimeError),
    /// An `early_return` unwinding with its value.
    Return(Value),
    /// A `break` looking for its enclosing loop.
    Break,
    /// A `continue` looking for its enclosing loop.
    Continue,
}

impl From<RuntimeError> for Signal {
    fn from(error: RuntimeError) -> Self {
        Self::Error(error)
    }
}

impl Signal {
    /// Collapses the signal at the host boundary. Errors pass through; a
    /// control signal that reached the host escaped its installing frame,
    /// which is a domain error of its own.
    #[must_use]
    pub fn into_runtime_error(self) -> RuntimeError {
        match self {
            Self::Error(error) => error,
            Self::Return(value) => RuntimeError::NotInDomain {
                value,
                explanation: "there is no early_return frame to return to".to_string(),
            },
            Self::Break => RuntimeError::NotInDomain {
                value:       Value::Symbol("break".to_string()),
                explanation: "there is no enclosing loop".to_string(),
            },
            Self::Continue => RuntimeError::NotInDomain {
                value:       Value::Symbol("continue".to_string()),
                explanation: "there is no enclosing loop".to_string(),
            },
        }
    }
}

/// Result type used by the evaluator and every native.
pub type EvalResult<T> = Result<T, Signal>;

/// Evaluates an expression in an environment.
///
/// The walk is strict: operands evaluate fully (left to right, arguments
/// before application) and the first failure short-circuits. Only lambdas
/// delay anything, by capturing the current environment node.
///
/// # Errors
/// Any [`Signal`] raised while evaluating.
pub fn interpret(expr: &Expr, env: &EnvRef) -> EvalResult<Value> {
    match expr {
        Expr::Name(name) => match env.lookup(name) {
            Some(value) => Ok(value),
            None => Err(RuntimeError::UndefinedName(name.clone()).into()),
        },
        Expr::Dec(dec) => Ok(Value::Unit(Unit::dimensionless(dec.clone()))),
        Expr::Str(text) => Ok(Value::Str(text.clone())),
        Expr::Symbol(name) => Ok(Value::Symbol(name.clone())),
        Expr::Table(entries) => {
            let mut table = Table::new();
            for (key, value_expr) in entries {
                let value = interpret(value_expr, env)?;
                table.insert(key.clone(), value);
            }
            Ok(Value::Table(table))
        },
        Expr::App { fun, arg } => {
            let callee = interpret(fun, env)?;
            let argument = interpret(arg, env)?;
            apply(callee, argument, env)
        },
        Expr::Cond { test,
                     then_branch,
                     else_branch, } => {
            let condition = match interpret(test, env)? {
                Value::Bool(b) => b,
                other => return Err(other.unexpected("a boolean").into()),
            };
            if condition {
                interpret(then_branch, env)
            } else {
                interpret(else_branch, env)
            }
        },
        Expr::Lam(lambda) => Ok(Value::Fun(Rc::clone(lambda), Rc::clone(env))),
    }
}

/// Applies a callee to an argument, dispatching on the callee's kind.
///
/// Closures run their body in a child of the environment they captured —
/// never the caller's. Tables respond to symbols. Natives decide for
/// themselves. Everything else is a type error.
///
/// # Errors
/// `UnexpectedType` for uncallable callees or non-symbol table keys,
/// `MissingKey` for absent table entries, plus whatever the callee raises.
pub fn apply(callee: Value, arg: Value, env: &EnvRef) -> EvalResult<Value> {
    match callee {
        Value::Native(native) => (native.fun)(arg, env),
        Value::Fun(lambda, closure) => {
            // The caller's environment participates only in destructuring
            // extraction; the body's lexical scope is the closure.
            let bindings = bind(&lambda.param, &arg, env)?;
            let frame = Environment::child(&closure, bindings.into_iter().collect());
            interpret(&lambda.body, &frame)
        },
        Value::Table(table) => match arg {
            Value::Symbol(key) => match table.get(&key) {
                Some(value) => Ok(value.clone()),
                None => Err(RuntimeError::MissingKey(key).into()),
            },
            other => Err(other.unexpected("a symbol").into()),
        },
        other => Err(other.unexpected("a table, function or native").into()),
    }
}

/// Matches an argument against a parameter pattern, producing bindings.
///
/// Table patterns extract each entry by *applying* the argument to the key
/// as a symbol, so destructuring works against anything that answers
/// symbols: literal tables, builtin modules, or user functions that choose
/// to. That application is the whole duck-typing contract.
///
/// # Errors
/// Whatever extraction raises; typically `MissingKey` or `UnexpectedType`.
pub fn bind(param: &Pattern, value: &Value, env: &EnvRef) -> EvalResult<Vec<(String, Value)>> {
    match param {
        Pattern::Single(name) => Ok(vec![(name.clone(), value.clone())]),
        Pattern::Table(entries) => {
            let mut bindings = Vec::new();
            for (key, sub_pattern) in entries {
                let extracted = apply(value.clone(), Value::Symbol(key.clone()), env)?;
                bindings.extend(bind(sub_pattern, &extracted, env)?);
            }
            Ok(bindings)
        },
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;

    use super::*;
    use crate::{
        ast::Lambda,
        interpreter::value::core::{LazyName, NativeFun},
    };

    fn env() -> EnvRef {
        Environment::root()
    }

    fn dec(n: i32) -> Value {
        Value::Unit(Unit::dimensionless(BigDecimal::from(n)))
    }

    fn name(n: &str) -> Expr {
        Expr::Name(n.to_string())
    }

    fn app(fun: Expr, arg: Expr) -> Expr {
        Expr::App { fun: Box::new(fun),
                    arg: Box::new(arg), }
    }

    #[test]
    fn names_resolve_through_the_environment() {
        let env = env();
        env.define("x", dec(3));
        assert_eq!(interpret(&name("x"), &env), Ok(dec(3)));
        assert_eq!(interpret(&name("y"), &env),
                   Err(RuntimeError::UndefinedName("y".to_string()).into()));
    }

    #[test]
    fn tables_evaluate_in_order_and_overwrite_duplicates() {
        let env = env();
        let table = Expr::Table(vec![("x".to_string(), Expr::Dec(1.into())),
                                     ("x".to_string(), Expr::Dec(2.into())),]);
        let Value::Table(result) = interpret(&table, &env).expect("evaluates") else {
            panic!("expected a table")
        };
        assert_eq!(result.len(), 1);
        assert_eq!(result.get("x"), Some(&dec(2)));
    }

    #[test]
    fn conditions_must_be_boolean() {
        let env = env();
        let cond = Expr::Cond { test:        Box::new(Expr::Dec(1.into())),
                                then_branch: Box::new(Expr::Dec(1.into())),
                                else_branch: Box::new(Expr::Dec(2.into())), };
        let Err(Signal::Error(RuntimeError::UnexpectedType { expected, .. })) =
            interpret(&cond, &env)
        else {
            panic!("expected a type error")
        };
        assert_eq!(expected, "a boolean");
    }

    #[test]
    fn closures_run_in_their_captured_scope() {
        let env = env();
        env.define("x", dec(1));

        // (y. x) evaluated now, applied after x changes: the closure sees
        // the same node, so it observes the in-place redefinition.
        let lambda = Expr::Lam(Rc::new(Lambda::new(Pattern::Single("y".to_string()),
                                                   name("x"))));
        let fun = interpret(&lambda, &env).expect("evaluates");
        env.define("x", dec(2));
        assert_eq!(apply(fun, dec(0), &env), Ok(dec(2)));
    }

    #[test]
    fn application_dispatches_on_tables() {
        let env = env();
        let mut table = Table::new();
        table.insert("y".to_string(), dec(20));
        let table = Value::Table(table);

        assert_eq!(apply(table.clone(), Value::Symbol("y".to_string()), &env), Ok(dec(20)));
        assert_eq!(apply(table.clone(), Value::Symbol("z".to_string()), &env),
                   Err(RuntimeError::MissingKey("z".to_string()).into()));
        assert!(matches!(apply(table, dec(1), &env),
                         Err(Signal::Error(RuntimeError::UnexpectedType { .. }))));
    }

    #[test]
    fn uncallable_values_are_type_errors() {
        let env = env();
        assert!(matches!(apply(dec(1), dec(2), &env),
                         Err(Signal::Error(RuntimeError::UnexpectedType { .. }))));
    }

    #[test]
    fn binding_extracts_by_symbol_application() {
        let env = env();

        // A native that answers any symbol with 7 — duck typing means the
        // table pattern must accept it as if it were a table.
        let duck = Value::Native(NativeFun { name: LazyName::literal("duck"),
                                             fun:  Rc::new(|arg, _| {
                                                 arg.as_symbol()?;
                                                 Ok(Value::Unit(Unit::dimensionless(7.into())))
                                             }), });

        let pattern = Pattern::Table(vec![("a".to_string(),
                                           Pattern::Single("x".to_string()))]);
        let bindings = bind(&pattern, &duck, &env).expect("binds");
        assert_eq!(bindings, vec![("x".to_string(), dec(7))]);
    }

    #[test]
    fn stray_control_signals_become_domain_errors() {
        let error = Signal::Break.into_runtime_error();
        assert!(matches!(error, RuntimeError::NotInDomain { .. }));
        let error = Signal::Error(RuntimeError::MissingKey("k".to_string())).into_runtime_error();
        assert_eq!(error, RuntimeError::MissingKey("k".to_string()));
    }
}
