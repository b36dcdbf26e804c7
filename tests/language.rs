use std::{cell::RefCell, collections::HashMap, fs, rc::Rc};

use calq::{
    error::{LangError, RuntimeError},
    interpreter::{
        evaluator::prelude::ModuleCache,
        parser::options::Priority,
        value::{core::Unit, dimension::Dimension},
    },
    Interpreter, IoHandle, Value,
};
use walkdir::WalkDir;

/// A scripted host: output is recorded, input is canned, modules come from
/// an in-memory map, and the import cache is shared with every loader so
/// circular chains are observable.
#[derive(Clone)]
struct TestHandle {
    output:  Rc<RefCell<Vec<String>>>,
    input:   Rc<RefCell<Vec<String>>>,
    modules: Rc<RefCell<HashMap<String, String>>>,
    cache:   ModuleCache,
}

impl TestHandle {
    fn new() -> Self {
        Self { output:  Rc::new(RefCell::new(Vec::new())),
               input:   Rc::new(RefCell::new(Vec::new())),
               modules: Rc::new(RefCell::new(HashMap::new())),
               cache:   Rc::new(RefCell::new(HashMap::new())), }
    }

    fn session(&self) -> Interpreter {
        Interpreter::with_parts(Rc::new(self.clone()),
                                None,
                                None,
                                Some("test".to_string()),
                                Some(Rc::clone(&self.cache)))
    }
}

impl IoHandle for TestHandle {
    fn read_line(&self) -> String {
        self.input.borrow_mut().pop().unwrap_or_default()
    }

    fn write_line(&self, line: &str) {
        self.output.borrow_mut().push(line.to_string());
    }

    fn exit(&self) {}

    fn resolve_module(&self, _from: &str, name: &str) -> Option<Result<Value, LangError>> {
        let source = self.modules.borrow().get(name).cloned()?;
        let loader = Interpreter::with_parts(Rc::new(self.clone()),
                                             None,
                                             None,
                                             Some(name.to_string()),
                                             Some(Rc::clone(&self.cache)));
        Some(loader.run_multiline_return_last(&source))
    }
}

fn eval(source: &str) -> Result<Value, LangError> {
    TestHandle::new().session().run_multiline_return_last(source)
}

fn dec(text: &str) -> Value {
    Value::Unit(Unit::dimensionless(text.parse().expect("decimal")))
}

fn assert_dec(source: &str, expected: &str) {
    match eval(source) {
        Ok(value) => assert_eq!(value, dec(expected), "'{source}'"),
        Err(e) => panic!("'{source}' failed: {e}"),
    }
}

fn assert_str(source: &str, expected: &str) {
    assert_eq!(eval(source), Ok(Value::Str(expected.to_string())), "'{source}'");
}

fn assert_bool(source: &str, expected: bool) {
    assert_eq!(eval(source), Ok(Value::Bool(expected)), "'{source}'");
}

fn runtime_error(source: &str) -> RuntimeError {
    match eval(source) {
        Err(LangError::Runtime(error)) => error,
        Ok(value) => panic!("'{source}' evaluated to {value:?} instead of failing"),
        Err(other) => panic!("'{source}' failed in the wrong stage: {other}"),
    }
}

#[test]
fn arithmetic_and_precedence() {
    assert_dec("2 + 2", "4");
    assert_dec("1 + 2 * 3", "7");
    assert_dec("10 - 2 - 3", "5");
    assert_dec("2 ^ 10", "1024");
    assert_dec("9 ^/ 2", "3");
    assert_dec("7 / 2", "3.5");
    assert_dec("0.1 + 0.2", "0.3");
}

#[test]
fn application_and_currying() {
    assert_dec("(x y. x) 7 9", "7");
    assert_dec("(x y. y) 7 9", "9");
    assert_dec("(f x. f (f x)) (n. n * 2) 3", "12");
}

#[test]
fn operator_sections_compose() {
    assert_dec("(+ 2) 5", "7");
    assert_dec("(2 -) 5", "-3");
    assert_dec("(-) 2 5", "-3");
    assert_dec("((+ 2) >> (* 3)) 4", "18");
    assert_dec("((* 3) << (+ 2)) 4", "18");
    assert_dec("3 |> (+ 1)", "4");
    assert_dec("(+ 1) $ 3", "4");
}

#[test]
fn tables_answer_symbols() {
    assert_dec("{x: 10, y: 20} :y", "20");
    assert_dec("{x: 1, x: 2} :x", "2");
    assert_eq!(runtime_error("{x: 1} :z"), RuntimeError::MissingKey("z".to_string()));

    // Shorthand entries read from scope.
    assert_dec(":a .= 5; {a} :a", "5");
}

#[test]
fn destructuring_parameters_are_duck_typed() {
    assert_dec("({x: a}. a) {x: 5}", "5");
    assert_dec("({x: a, y: b}. a + b) {y: 2, x: 1}", "3");
    assert_dec("({x: {y}}. y) {x: {y: 9}}", "9");

    // Extraction is application, so a missing entry is a MissingKey.
    assert_eq!(runtime_error("({q: a}. a) {x: 1}"),
               RuntimeError::MissingKey("q".to_string()));
}

#[test]
fn strings_concatenate() {
    assert_str("\"hello\" ++ \" \" ++ \"world\"", "hello world");
    assert_str("'single' ++ \" and \" ++ 'double'", "single and double");
    assert_str("Str:upper \"abc\"", "ABC");
    assert_dec("Str:length \"héllo\"", "5");
}

#[test]
fn recursion_through_top_level_definitions() {
    assert_dec(":f .= (n. if n < 1 then 1 else n * f (n - 1)); f 5", "120");
    assert_dec(":fib .= (n. if n < 2 then n else fib (n - 1) + fib (n - 2)); fib 10", "55");
}

#[test]
fn definitions_mutate_the_root_in_place() {
    // The closure looked x up at call time through the parent chain, so it
    // sees the redefinition made after it was built.
    assert_dec(":x .= 1; :f .= ({}. x); :x .= 2; f {}", "2");

    // A definition made inside a call lands top-level and survives it.
    assert_dec("({}. :y .= 41) {}; y + 1", "42");
}

#[test]
fn conditionals_require_booleans() {
    assert_dec("if 2 < 3 then 7 else 11", "7");
    assert_dec("if 2 > 3 then 7 else 11", "11");
    assert!(matches!(runtime_error("if 1 then 2 else 3"),
                     RuntimeError::UnexpectedType { .. }));
}

#[test]
fn dimensions_follow_quantities() {
    let product = eval("meters 2 * seconds 3").expect("evaluates");
    let unit = product.as_unit().expect("unit");
    assert_eq!(unit.dim, Dimension::length().multiply(&Dimension::time()));

    let speed = eval("meters 6 / seconds 2").expect("evaluates");
    assert_eq!(speed.as_unit().expect("unit").dim,
               Dimension::length().divide(&Dimension::time()));

    assert_bool("meters 1 + meters 2 ~= meters 3", true);
}

#[test]
fn mismatched_dimensions_do_not_add() {
    let RuntimeError::DimensionMismatch { left, right } = runtime_error("meters 3 + seconds 4")
    else {
        panic!("expected a dimension mismatch")
    };
    assert_eq!(left, Dimension::length());
    assert_eq!(right, Dimension::time());

    assert!(matches!(runtime_error("meters 1 < seconds 1"),
                     RuntimeError::DimensionMismatch { .. }));
}

#[test]
fn unit_constructors_demand_plain_numbers() {
    assert!(matches!(runtime_error("meters (seconds 1)"),
                     RuntimeError::NotInDomain { .. }));
    assert!(matches!(runtime_error("2 ^ (meters 2)"), RuntimeError::NotInDomain { .. }));
    assert!(matches!(runtime_error("1 / 0"), RuntimeError::NotInDomain { .. }));
}

#[test]
fn weak_equality_is_structural() {
    assert_bool("2 ~= 2.0", true);
    assert_bool("{x: 1, y: 2} ~= {y: 2, x: 1}", true);
    assert_bool("{x: 1} ~= {x: 2}", false);
    assert_bool(":a ~= :a", true);
    assert_bool("\"1\" ~= 1", false);
    assert!(matches!(runtime_error("(x. x) ~= (x. x)"), RuntimeError::NotInDomain { .. }));
}

#[test]
fn fallback_retries_on_missing_keys_only() {
    assert_dec("({x: 1} |? {y: 2}) :y", "2");
    assert_dec("({x: 1} |? {y: 2}) :x", "1");
    assert_dec("({x: 1} |? {y: 2} |? {z: 3}) :z", "3");

    // A non-MissingKey failure in the primary propagates.
    assert!(matches!(runtime_error("((v. IO:raise \"boom\") |? {y: 2}) :y"),
                     RuntimeError::Other(_)));
}

#[test]
fn backtick_expressions_sit_in_operator_position() {
    assert_dec("6 `(x y. x + y)` 7", "13");
    assert_dec(":avg .= (x y. (x + y) / 2); 3 `avg` 5", "4");
}

#[test]
fn priorities_can_change_between_expressions() {
    let handle = TestHandle::new();
    let session = handle.session();

    assert_eq!(session.run_line("2 + 3 * 4"), Ok(dec("14")));
    session.options().borrow_mut().set_priority("+", Priority::left(10));
    assert_eq!(session.run_line("2 + 3 * 4"), Ok(dec("20")));
}

#[test]
fn imperative_loops_drive_top_level_state() {
    assert_dec(":n .= 0; Imp:while ({}. n < 3) ({}. :n .= n + 1); n", "3");

    // break leaves early, continue skips.
    assert_dec(":n .= 0; \
                Imp:while ({}. true) \
                          ({}. if n < 5 then :n .= n + 1 else Imp:break {}); \
                n",
               "5");
}

#[test]
fn early_return_unwinds_to_its_installer() {
    assert_dec("Imp:early_return (return. Imp:chain {a: ({}. return 5), b: ({}. 9)})", "5");
    assert_dec("Imp:early_return (return. 9)", "9");

    // A stray control signal is rejected at the host boundary.
    assert!(matches!(runtime_error("Imp:break {}"), RuntimeError::NotInDomain { .. }));
}

#[test]
fn when_and_chain_sequence_effects() {
    assert_dec("Imp:when true ({}. 3)", "3");
    assert_bool("Imp:when false ({}. 3) ~= {}", true);
    assert_dec("Imp:chain {a: ({}. 1), b: ({}. 2)}", "2");
}

#[test]
fn io_print_passes_through_and_writes() {
    let handle = TestHandle::new();
    let session = handle.session();

    assert_eq!(session.run_line("IO:print (2 + 2)"), Ok(dec("4")));
    assert_eq!(handle.output.borrow().as_slice(), ["4".to_string()]);

    session.run_line("IO:print \"plain text\"").expect("prints");
    assert_eq!(handle.output.borrow().last().map(String::as_str), Some("plain text"));
}

#[test]
fn io_try_reifies_runtime_errors() {
    assert_bool("(IO:try ({}. 1 / 0)) :ok", false);
    assert_bool("(IO:try ({}. 6 * 7)) :ok", true);
    assert_dec("(IO:try ({}. 6 * 7)) :value", "42");
    assert_bool("((IO:try ({}. {} :nope)) :error) :kind ~= :missing_key", true);

    // User-raised values come back out of the reified table.
    assert_str("((IO:try ({}. IO:raise \"why\")) :error) :value", "why");
}

#[test]
fn io_read_line_consumes_host_input() {
    let handle = TestHandle::new();
    handle.input.borrow_mut().push("forty two".to_string());
    let session = handle.session();
    assert_eq!(session.run_line("IO:read_line {}"),
               Ok(Value::Str("forty two".to_string())));
}

#[test]
fn modules_memoise_and_reject_cycles() {
    let handle = TestHandle::new();
    handle.modules.borrow_mut().insert("geometry".to_string(),
                                       ":pi .= 3.14159; {pi: pi, tau: pi * 2}".to_string());
    let session = handle.session();

    assert_eq!(session.run_line("(IO:import \"geometry\") :tau"), Ok(dec("6.28318")));
    // Memoised: the second import is the same table, not a re-evaluation.
    assert_eq!(session.run_line("(IO:import \"geometry\") :pi"), Ok(dec("3.14159")));

    handle.modules.borrow_mut().insert("a".to_string(),
                                       "IO:import \"b\"".to_string());
    handle.modules.borrow_mut().insert("b".to_string(),
                                       "IO:import \"a\"".to_string());
    let error = session.run_line("IO:import \"a\"").expect_err("cycles");
    assert!(error.to_string().contains("circular"), "got: {error}");
}

#[test]
fn reflection_names_kinds_and_shows_source() {
    assert_bool("Refl:kind {} ~= :table", true);
    assert_bool("Refl:kind :x ~= :symbol", true);
    assert_bool("Refl:kind (x. x) ~= :function", true);
    assert_str("Refl:show (x y. x)", "x y. x");
    assert_str("Refl:show (+ 2)", "(+ 2)");
    assert_str("Refl:show {x: \"a\"}", "{x: \"a\"}");
    assert_dec(":q .= 8; (Refl:captured (x. q)) :q", "8");
}

#[test]
fn symbols_convert_to_and_from_strings() {
    assert_str("Sym:name :hello", "hello");
    assert_bool("Sym:from \"hello\" ~= :hello", true);
}

#[test]
fn modules_expose_their_table() {
    assert_bool("(Sym:__table__ :name) :x ~= \"x\"", true);
    assert_bool("Refl:kind (IO:__table__ :print) ~= :native", true);
}

#[test]
fn predicate_style_names_work_end_to_end() {
    assert_bool(":even? .= (n. n / 2 ~= 5); even? 10", true);
}

#[test]
fn leftovers_after_a_single_line_are_parse_errors() {
    let handle = TestHandle::new();
    let session = handle.session();
    // `1 2` parses (it is an application) and fails only at runtime.
    assert!(matches!(session.run_line("1 2"), Err(LangError::Runtime(_))));
    assert!(matches!(session.run_line("1; 2"), Err(LangError::Parse(_))));
    assert!(matches!(session.run_line("}"), Err(LangError::Parse(_))));
    assert!(matches!(session.run_line("2 @"), Err(LangError::Lex(_))));
}

#[test]
fn book_examples_work() {
    let mut count = 0;

    for entry in WalkDir::new("book/src").into_iter()
                                         .filter_map(Result::ok)
                                         .filter(|e| {
                                             e.path().extension().is_some_and(|ext| ext == "md")
                                         })
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        for (i, code) in extract_calq_blocks(&content).into_iter().enumerate() {
            count += 1;
            let handle = TestHandle::new();
            if let Err(e) = handle.session().run_multiline(&code) {
                panic!("Example {} in {:?} failed:\n{}\nError: {}", i + 1, path, code, e);
            }
        }
    }

    assert!(count > 0, "No calq examples found in book/src");
}

fn extract_calq_blocks(content: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut inside = false;
    let mut buf = String::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```calq") {
            inside = true;
            buf.clear();
            continue;
        }
        if inside && trimmed.starts_with("```") {
            inside = false;
            blocks.push(buf.clone());
            continue;
        }
        if inside {
            buf.push_str(line);
            buf.push('\n');
        }
    }

    blocks
}
