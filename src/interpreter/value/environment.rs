use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;

use crate::interpreter::value::core::Value;

/// A shared, reference-counted environment node.
pub type EnvRef = Rc<Environment>;

/// One node in the environment chain.
///
/// Nodes form a tree rooted at the prelude; a closure keeps the exact node
/// that was current at its creation. The name map is interior-mutable and
/// only ever mutated at a single node (`.=`, `IO:define`, `IO:forget`), so
/// every closure holding a reference into the chain observes top-level
/// definitions made after it was built. That is how a recursive binding
/// like `:f .= (n. … f …)` finds itself at call time.
pub struct Environment {
    parent: Option<EnvRef>,
    names:  RefCell<IndexMap<String, Value>>,
}

impl Environment {
    /// Creates an empty root node.
    #[must_use]
    pub fn root() -> EnvRef {
        Rc::new(Self { parent: None,
                       names:  RefCell::new(IndexMap::new()), })
    }

    /// Creates a child node holding `names`, chained to `parent`.
    #[must_use]
    pub fn child(parent: &EnvRef, names: IndexMap<String, Value>) -> EnvRef {
        Rc::new(Self { parent: Some(Rc::clone(parent)),
                       names:  RefCell::new(names), })
    }

    /// Looks `name` up, walking the parent chain outward.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.names.borrow().get(name) {
            return Some(value.clone());
        }

        let mut current = self.parent.clone();
        while let Some(env) = current {
            if let Some(value) = env.names.borrow().get(name) {
                return Some(value.clone());
            }
            current = env.parent.clone();
        }
        None
    }

    /// Installs or overwrites `name` at this node, in place.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.names.borrow_mut().insert(name.into(), value);
    }

    /// Removes `name` from this node only. Returns whether it was present.
    /// Bindings in parent nodes are untouched and may become visible again.
    pub fn forget(&self, name: &str) -> bool {
        self.names.borrow_mut().shift_remove(name).is_some()
    }

    /// Installs `name` at the top of the chain — the node the session is
    /// rooted in. This is what `.=` and `IO:define` do: wherever they run,
    /// the binding lands top-level, where every closure chained under the
    /// root observes it.
    pub fn define_at_top(&self, name: impl Into<String>, value: Value) {
        match self.top() {
            Some(top) => top.define(name, value),
            None => self.define(name, value),
        }
    }

    /// Removes `name` from the top of the chain; the `IO:forget`
    /// counterpart of [`Environment::define_at_top`].
    pub fn forget_at_top(&self, name: &str) -> bool {
        match self.top() {
            Some(top) => top.forget(name),
            None => self.forget(name),
        }
    }

    /// The root node of the chain, or `None` when this node is the root
    /// (it cannot hand out an owning reference to itself).
    fn top(&self) -> Option<EnvRef> {
        let mut node = self.parent.clone()?;
        while let Some(parent) = node.parent.clone() {
            node = parent;
        }
        Some(node)
    }
}

// Closures point back into the environment that holds them, so a derived
// Debug would recurse forever. Print the local names and stop.
impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names.borrow();
        write!(f,
               "Environment {{ names: [{}], parent: {} }}",
               names.keys().cloned().collect::<Vec<_>>().join(", "),
               if self.parent.is_some() { "yes" } else { "no" })
    }
}
