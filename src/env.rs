// ABOUTME: Environment frames: name bindings, parent chain, and the step counter

use crate::config::STEP_CEILING;
use crate::value::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
    steps: Cell<usize>,
}

impl Environment {
    /// Creates a root frame with no parent and a full step budget.
    pub fn new() -> Rc<Self> {
        Self::with_limit(STEP_CEILING)
    }

    /// Creates a root frame with a custom step ceiling.
    pub fn with_limit(steps: usize) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
            steps: Cell::new(steps),
        })
    }

    /// Creates a lexical child frame. The counter carries over from the
    /// parent, which is the right thing for `let`-style extension.
    pub fn extend(parent: Rc<Environment>) -> Rc<Self> {
        let steps = parent.steps.get();
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
            steps: Cell::new(steps),
        })
    }

    /// Creates a per-call frame: lexically a child of the function's
    /// definition site, but inheriting the *caller's* remaining steps so
    /// the budget depletes along the dynamic stack.
    pub fn call_frame(parent: Rc<Environment>, caller: &Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
            steps: Cell::new(caller.steps.get()),
        })
    }

    /// Defines a binding in THIS frame, shadowing any outer binding.
    pub fn define(&self, name: String, value: Value) {
        self.bindings.borrow_mut().insert(name, value);
    }

    /// Looks a name up in this frame and then in parents.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        if let Some(ref parent) = self.parent {
            return parent.lookup(name);
        }
        None
    }

    /// Rebinds `name` in every frame of the chain that already contains
    /// it (the `swap` special form). Returns whether any frame matched.
    pub fn set_all(&self, name: &str, value: Value) -> bool {
        let mut found = false;
        if self.bindings.borrow().contains_key(name) {
            self.bindings
                .borrow_mut()
                .insert(name.to_string(), value.clone());
            found = true;
        }
        if let Some(ref parent) = self.parent {
            found |= parent.set_all(name, value);
        }
        found
    }

    pub fn steps(&self) -> usize {
        self.steps.get()
    }

    pub fn reset_steps(&self, steps: usize) {
        self.steps.set(steps);
    }

    /// Burns one step of the budget; `false` means the ceiling was hit.
    pub fn consume_step(&self) -> bool {
        let remaining = self.steps.get();
        if remaining == 0 {
            return false;
        }
        self.steps.set(remaining - 1);
        true
    }
}
