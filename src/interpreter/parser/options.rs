use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Which way an operator groups when it meets itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    /// `a ⊕ b ⊕ c` groups as `(a ⊕ b) ⊕ c`.
    Left,
    /// `a ⊕ b ⊕ c` groups as `a ⊕ (b ⊕ c)`.
    Right,
}

/// The binding behavior of one infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    /// Higher strength binds tighter.
    pub strength:      i64,
    /// Grouping direction at equal strength.
    pub associativity: Associativity,
}

impl Priority {
    /// A left-associative priority.
    #[must_use]
    pub const fn left(strength: i64) -> Self {
        Self { strength,
               associativity: Associativity::Left, }
    }

    /// A right-associative priority.
    #[must_use]
    pub const fn right(strength: i64) -> Self {
        Self { strength,
               associativity: Associativity::Right, }
    }
}

/// The operator table the parser consults while resolving infix chains.
///
/// This lives behind a shared handle ([`OptionsHandle`]) and is read afresh
/// on every parse, so a host may rebind an operator's priority between
/// top-level expressions and the next expression sees the change. Nothing
/// is copied into parser closures.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Priority per operator name.
    pub priorities:        HashMap<String, Priority>,
    /// Priority of a backtick-quoted expression in operator position.
    pub backtick_priority: Priority,
    /// Priority of any operator absent from `priorities`.
    pub default_priority:  Priority,
}

impl ParseOptions {
    /// Looks up an operator's priority, falling back to the default.
    #[must_use]
    pub fn priority_of(&self, name: &str) -> Priority {
        self.priorities.get(name).copied().unwrap_or(self.default_priority)
    }

    /// Rebinds one operator's priority.
    pub fn set_priority(&mut self, name: impl Into<String>, priority: Priority) {
        self.priorities.insert(name.into(), priority);
    }
}

impl Default for ParseOptions {
    /// The table matching the prelude's operators.
    fn default() -> Self {
        let entries: [(&str, Priority); 18] = [("^", Priority::right(9)),
                                               ("^/", Priority::right(9)),
                                               ("*", Priority::left(8)),
                                               ("/", Priority::left(8)),
                                               ("<<", Priority::right(7)),
                                               (">>", Priority::left(7)),
                                               ("+", Priority::left(6)),
                                               ("-", Priority::left(6)),
                                               ("++", Priority::left(6)),
                                               ("<", Priority::left(4)),
                                               (">", Priority::left(4)),
                                               ("<=", Priority::left(4)),
                                               (">=", Priority::left(4)),
                                               ("~=", Priority::left(4)),
                                               ("|?", Priority::right(3)),
                                               ("|>", Priority::left(2)),
                                               ("$", Priority::right(1)),
                                               (".=", Priority::right(0))];

        Self { priorities:        entries.iter()
                                         .map(|(name, priority)| (name.to_string(), *priority))
                                         .collect(),
               backtick_priority: Priority::left(5),
               default_priority:  Priority::left(5), }
    }
}

/// The shared, interior-mutable handle the parser dereferences each call.
pub type OptionsHandle = Rc<RefCell<ParseOptions>>;

/// Creates a fresh handle around the default table.
#[must_use]
pub fn default_options() -> OptionsHandle {
    Rc::new(RefCell::new(ParseOptions::default()))
}
