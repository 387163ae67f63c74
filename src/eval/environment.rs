use crate::eval::value::Value;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Shared handle to a scope. Closures and the calls made through them hold
/// the same handle, so a scope outlives the call that created it.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Env>,
}

impl Environment {
    pub fn new(outer: Option<Env>) -> Env {
        Rc::new(RefCell::new(Self {
            store: HashMap::new(),
            outer,
        }))
    }

    pub fn root() -> Env {
        Self::new(None)
    }

    pub fn new_with_outer(outer: Env) -> Env {
        Self::new(Some(outer))
    }

    /// Looks `entry` up in this scope, then outward through the enclosing scopes.
    pub fn get(&self, entry: &str) -> Option<Value> {
        match self.store.get(entry) {
            Some(val) => Some(val.clone()),
            None => match self.outer {
                Some(ref outer) => outer.borrow().get(entry),
                None => None,
            },
        }
    }

    /// Binds `key` in this scope only; an outer binding of the same name is shadowed.
    pub fn set(&mut self, key: &str, val: Value) -> Value {
        self.store.insert(key.to_string(), val.clone());
        val
    }
}
