use std::{cell::RefCell, collections::HashMap, fs, path::Path, rc::Rc};

use crate::{
    ast::Expr,
    error::LangError,
    interpreter::{
        evaluator::{core::interpret, prelude, prelude::ModuleCache},
        parser::{options::OptionsHandle, ExprParser},
        value::{
            core::{Table, Value},
            environment::EnvRef,
        },
    },
};

/// The evaluator: the recursive tree walk, application dispatch, pattern
/// binding, non-local exit signals, and the prelude that populates the
/// root environment.
///
/// # Responsibilities
/// - Evaluates expressions to values, short-circuiting on the first error.
/// - Implements polymorphic application over natives, closures and tables.
/// - Provides every builtin binding the language ships with.
pub mod evaluator;
/// The lexer: source text to tokens in one longest-match pass.
///
/// # Responsibilities
/// - Produces the closed token set the grammar is written against.
/// - Keeps raw text and byte offsets so the stream reproduces the source.
/// - Rejects untokenizable input with the offending slice, never partially.
pub mod lexer;
/// The parser: combinator engine, expression grammar, operator tables and
/// the shunting-yard resolver.
///
/// # Responsibilities
/// - Builds the AST from tokens with backtrack-free error discipline.
/// - Resolves infix chains against the mutable operator table.
/// - Exposes the options handle hosts use to rebind precedences.
pub mod parser;
/// Runtime values: the value enum, SI dimensions and environments.
///
/// # Responsibilities
/// - Defines every runtime variant and its checked accessors.
/// - Implements dimensional algebra over exact rational exponents.
/// - Provides the mutable-in-place environment chain closures capture.
pub mod value;

/// Everything the core asks of its host.
///
/// The core performs no I/O and resolves no modules on its own; a host
/// hands an implementation of this to [`Interpreter::new`] and the `IO`
/// module routes through it.
pub trait IoHandle {
    /// Reads one line of input, without the trailing newline.
    fn read_line(&self) -> String;

    /// Writes one line of output.
    fn write_line(&self, line: &str);

    /// Asks the host to end the session.
    fn exit(&self);

    /// Resolves a module by name, from the standpoint of the code at
    /// `from_location`. `None` means no such module; otherwise the host
    /// returns the module's evaluated value or the error loading produced.
    fn resolve_module(&self, from_location: &str, module_name: &str)
                      -> Option<Result<Value, LangError>>;
}

/// A running language session: a parser, an environment and a host handle,
/// glued into the lex–parse–evaluate pipeline.
///
/// Top-level code evaluates directly in the root node the prelude
/// populates. `.=` and `IO:define` write into that same node, which is how
/// their bindings become visible through every closure chained under it —
/// and why `IO:forget` can remove a builtin just as readily as a user
/// definition. The builtins are ordinary bindings, not a protected layer.
pub struct Interpreter {
    env:    EnvRef,
    parser: ExprParser,
}

impl Interpreter {
    /// Creates a session with a fresh prelude, default operator table and
    /// an unnamed location.
    #[must_use]
    pub fn new(handle: Rc<dyn IoHandle>) -> Self {
        Self::with_parts(handle, None, None, None, None)
    }

    /// Creates a session with full control over the parts.
    ///
    /// # Parameters
    /// - `handle`: The host implementation the `IO` module captures.
    /// - `parent_env`: The environment to run top-level code in, instead
    ///   of building a fresh prelude; hosts that want several sessions
    ///   over one root pass the same reference to each.
    /// - `options`: An operator table to share; `None` takes the default.
    /// - `location`: Where this code nominally lives, passed back to the
    ///   host when resolving imports.
    /// - `modules`: A shared import cache; sharing it across the session's
    ///   interpreters is what makes circular imports detectable.
    #[must_use]
    pub fn with_parts(handle: Rc<dyn IoHandle>,
                      parent_env: Option<EnvRef>,
                      options: Option<OptionsHandle>,
                      location: Option<String>,
                      modules: Option<ModuleCache>)
                      -> Self {
        let location = location.unwrap_or_default();
        let modules = modules.unwrap_or_else(|| Rc::new(RefCell::new(HashMap::new())));
        let env = parent_env.unwrap_or_else(|| prelude::build(&handle, &location, &modules));
        let parser = match options {
            Some(options) => ExprParser::with_options(options),
            None => ExprParser::new(),
        };
        Self { env, parser }
    }

    /// The session environment top-level code runs in.
    #[must_use]
    pub fn env(&self) -> EnvRef {
        Rc::clone(&self.env)
    }

    /// The shared operator table handle; mutations apply to the next parse.
    #[must_use]
    pub fn options(&self) -> OptionsHandle {
        self.parser.options()
    }

    /// Evaluates an already-parsed expression in the session environment.
    ///
    /// # Errors
    /// The runtime error, with stray control signals collapsed into domain
    /// errors at this boundary.
    pub fn run_ast(&self, expr: &Expr) -> Result<Value, LangError> {
        interpret(expr, &self.env).map_err(|signal| {
                                      LangError::Runtime(signal.into_runtime_error())
                                  })
    }

    /// Runs exactly one expression of source text. Anything left over
    /// after it is a parse error.
    ///
    /// # Errors
    /// A `LangError` from whichever pipeline stage failed first.
    pub fn run_line(&self, source: &str) -> Result<Value, LangError> {
        let tokens = lexer::lex(source)?;
        let expr = self.parser.parse_one(tokens)?;
        self.run_ast(&expr)
    }

    /// Runs any number of expressions, returning every value in order.
    ///
    /// # Errors
    /// The first failure, from whichever pipeline stage produced it;
    /// expressions after it do not run.
    pub fn run_multiline(&self, source: &str) -> Result<Vec<Value>, LangError> {
        let tokens = lexer::lex(source)?;
        let exprs = self.parser.parse_multiline(tokens)?;
        let mut values = Vec::with_capacity(exprs.len());
        for expr in &exprs {
            values.push(self.run_ast(expr)?);
        }
        Ok(values)
    }

    /// Runs any number of expressions, keeping only the last value; empty
    /// input evaluates to `{}`. This is how script files and modules
    /// produce their value.
    ///
    /// # Errors
    /// As [`Interpreter::run_multiline`].
    pub fn run_multiline_return_last(&self, source: &str) -> Result<Value, LangError> {
        let values = self.run_multiline(source)?;
        Ok(values.into_iter().last().unwrap_or(Value::Table(Table::new())))
    }
}

/// The standard host: stdin/stdout for I/O, the process for `exit`, and
/// `.calq` files next to the importing code for modules.
pub struct StdHandle {
    location: String,
    modules:  ModuleCache,
}

impl StdHandle {
    /// A handle rooted at `location` (a file path, or a label like
    /// `"repl"` for interactive sessions).
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self { location: location.into(),
               modules:  Rc::new(RefCell::new(HashMap::new())), }
    }

    /// The interpreter for this handle, wired to share its import cache.
    #[must_use]
    pub fn interpreter(self) -> Interpreter {
        let location = self.location.clone();
        let modules = Rc::clone(&self.modules);
        Interpreter::with_parts(Rc::new(self), None, None, Some(location), Some(modules))
    }

    fn sibling(&self, location: String) -> Self {
        Self { location,
               modules: Rc::clone(&self.modules), }
    }
}

impl IoHandle for StdHandle {
    fn read_line(&self) -> String {
        let mut line = String::new();
        // EOF or a broken pipe simply reads as empty.
        let _ = std::io::stdin().read_line(&mut line);
        line.truncate(line.trim_end_matches(['\n', '\r']).len());
        line
    }

    fn write_line(&self, line: &str) {
        println!("{line}");
    }

    fn exit(&self) {
        std::process::exit(0);
    }

    fn resolve_module(&self, from_location: &str, module_name: &str)
                      -> Option<Result<Value, LangError>> {
        let directory = Path::new(from_location).parent().unwrap_or_else(|| Path::new(""));
        let path = directory.join(format!("{module_name}.calq"));
        let source = fs::read_to_string(&path).ok()?;

        let location = path.to_string_lossy().into_owned();
        let loader = self.sibling(location.clone()).interpreter();
        Some(loader.run_multiline_return_last(&source))
    }
}
