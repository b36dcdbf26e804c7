use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{apply, EvalResult, Signal},
            prelude::{
                support::{binary, module, native, unit_value},
                ModuleCache,
            },
        },
        value::{
            core::{Table, Value},
            environment::EnvRef,
        },
    },
    IoHandle,
};

/// The value parked in the import cache while a module is loading. Seeing
/// it on lookup means the imports are circular.
pub const CIRCULAR_SENTINEL: &str = "__circular_import__";

/// The `.=` operator: `:name .= value` installs `name` top-level and
/// evaluates to the value.
#[must_use]
pub fn define_op() -> Value {
    binary(".=", define_in_env)
}

/// Builds the `IO` module around the host's handle.
pub fn build(handle: &Rc<dyn IoHandle>, location: &str, modules: &ModuleCache) -> Value {
    let print = {
        let handle = Rc::clone(handle);
        native("print", move |value, _| {
            handle.write_line(&value.to_string());
            Ok(value)
        })
    };
    let write = {
        let handle = Rc::clone(handle);
        native("write", move |value, _| {
            handle.write_line(value.as_str()?);
            Ok(unit_value())
        })
    };
    let read_line = {
        let handle = Rc::clone(handle);
        native("read_line", move |_, _| Ok(Value::Str(handle.read_line())))
    };
    let exit = {
        let handle = Rc::clone(handle);
        native("exit", move |_, _| {
            handle.exit();
            Ok(unit_value())
        })
    };

    module("IO",
           vec![("print", print),
                ("write", write),
                ("read_line", read_line),
                ("define", binary("define", define_in_env)),
                ("forget", native("forget", |arg, env| {
                    Ok(Value::Bool(env.forget_at_top(arg.as_symbol()?)))
                })),
                ("try", native("try", try_catch)),
                ("raise", native("raise", |value, _| {
                    Err(RuntimeError::Other(value).into())
                })),
                ("import", import(handle, location, modules)),
                ("exit", exit),])
}

/// Definitions land at the top of the chain wherever they run, so a
/// binding made inside a function body survives the call and becomes
/// visible to every closure chained under the session root.
fn define_in_env(symbol: Value, value: Value, env: &EnvRef) -> EvalResult<Value> {
    let name = symbol.as_symbol()?.to_string();
    env.define_at_top(name, value.clone());
    Ok(value)
}

/// `IO:try f` applies `f` to `{}` and reifies the outcome into a table:
/// `{ok: true, value: …}` on success, `{ok: false, error: …}` on a runtime
/// error. Control signals are not errors and pass through untouched.
fn try_catch(callee: Value, env: &EnvRef) -> EvalResult<Value> {
    match apply(callee, unit_value(), env) {
        Ok(value) => {
            let mut table = Table::new();
            table.insert("ok".to_string(), Value::Bool(true));
            table.insert("value".to_string(), value);
            Ok(Value::Table(table))
        },
        Err(Signal::Error(error)) => {
            let mut table = Table::new();
            table.insert("ok".to_string(), Value::Bool(false));
            table.insert("error".to_string(), reify(error));
            Ok(Value::Table(table))
        },
        Err(control) => Err(control),
    }
}

/// Turns a runtime error into a table user code can inspect. The `kind`
/// entry names the error; the remaining entries carry its fields.
fn reify(error: RuntimeError) -> Value {
    let mut table = Table::new();
    match error {
        RuntimeError::UnexpectedType { expected, got } => {
            table.insert("kind".to_string(), Value::Symbol("unexpected_type".to_string()));
            table.insert("expected".to_string(), Value::Str(expected));
            table.insert("got".to_string(), got);
        },
        RuntimeError::MissingKey(key) => {
            table.insert("kind".to_string(), Value::Symbol("missing_key".to_string()));
            table.insert("key".to_string(), Value::Str(key));
        },
        RuntimeError::UndefinedName(name) => {
            table.insert("kind".to_string(), Value::Symbol("undefined_name".to_string()));
            table.insert("name".to_string(), Value::Str(name));
        },
        RuntimeError::DimensionMismatch { left, right } => {
            table.insert("kind".to_string(),
                         Value::Symbol("dimension_mismatch".to_string()));
            table.insert("left".to_string(), Value::Str(left.describe()));
            table.insert("right".to_string(), Value::Str(right.describe()));
        },
        RuntimeError::NotInDomain { value, explanation } => {
            table.insert("kind".to_string(), Value::Symbol("not_in_domain".to_string()));
            table.insert("value".to_string(), value);
            table.insert("explanation".to_string(), Value::Str(explanation));
        },
        RuntimeError::Other(value) => {
            table.insert("kind".to_string(), Value::Symbol("other".to_string()));
            table.insert("value".to_string(), value);
        },
    }
    Value::Table(table)
}

/// `IO:import "name"` resolves a module through the host, memoised by name
/// for the whole session. While a load is in flight the cache holds a
/// sentinel so a circular chain fails instead of recursing forever.
fn import(handle: &Rc<dyn IoHandle>, location: &str, modules: &ModuleCache) -> Value {
    let handle = Rc::clone(handle);
    let location = location.to_string();
    let cache = Rc::clone(modules);

    native("import", move |arg, _| {
        let name = arg.as_str()?.to_string();

        if let Some(cached) = cache.borrow().get(&name).cloned() {
            if matches!(&cached, Value::Symbol(s) if s == CIRCULAR_SENTINEL) {
                return Err(RuntimeError::NotInDomain {
                    value:       arg.clone(),
                    explanation: format!("'{name}' is still loading; the imports are circular"),
                }.into());
            }
            return Ok(cached);
        }

        cache.borrow_mut()
             .insert(name.clone(), Value::Symbol(CIRCULAR_SENTINEL.to_string()));

        match handle.resolve_module(&location, &name) {
            Some(Ok(value)) => {
                cache.borrow_mut().insert(name, value.clone());
                Ok(value)
            },
            Some(Err(error)) => {
                cache.borrow_mut().remove(&name);
                Err(RuntimeError::NotInDomain { value:       arg.clone(),
                                                explanation: format!("loading failed: {error}"), }
                                              .into())
            },
            None => {
                cache.borrow_mut().remove(&name);
                Err(RuntimeError::NotInDomain {
                    value:       arg.clone(),
                    explanation: "no module with this name could be found".to_string(),
                }.into())
            },
        }
    })
}
