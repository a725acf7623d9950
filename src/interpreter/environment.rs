use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// A lexically nested name→value frame. Cloning an `Environment` shares the
/// underlying store, so a closure that captured a frame observes later
/// mutations of it; `enclosed` starts a fresh inner frame linked to its
/// parent.
///
/// Two keys are reserved by convention: `csv` holds the active table and
/// `filename` the last loaded path. User bindings may shadow both in inner
/// frames.
#[derive(Debug, Clone)]
pub struct Environment {
    store: Rc<RefCell<HashMap<String, Value>>>,
    outer: Option<Box<Environment>>,
}

impl Environment {
    pub fn new() -> Self {
        Self {
            store: Rc::new(RefCell::new(HashMap::new())),
            outer: None,
        }
    }

    /// A new innermost frame enclosing `outer`.
    pub fn enclosed(outer: &Environment) -> Self {
        Self {
            store: Rc::new(RefCell::new(HashMap::new())),
            outer: Some(Box::new(outer.clone())),
        }
    }

    /// Looks a name up, walking outward through enclosing frames.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.borrow().get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.get(name))
    }

    /// True when the name is bound in this frame or any enclosing one.
    pub fn contains(&self, name: &str) -> bool {
        self.store.borrow().contains_key(name)
            || self
                .outer
                .as_ref()
                .is_some_and(|outer| outer.contains(name))
    }

    /// Binds a name in the innermost frame, shadowing any outer binding.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.store.borrow_mut().insert(name.into(), value);
    }

    /// A snapshot of the bindings local to this frame, used by the for-loop
    /// write-back pass.
    pub fn local_bindings(&self) -> Vec<(String, Value)> {
        self.store
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
