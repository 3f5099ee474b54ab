use std::{cell::RefCell, collections::HashMap, rc::Rc};

use super::value::Value;

/// One lexical frame: a name→value mapping plus an optional link to the
/// enclosing frame. Frames are shared behind `Rc<RefCell<_>>` because
/// closures outlive the scopes that created them.
#[derive(Debug, Default)]
pub struct Environment {
    enclosing: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            enclosing: Some(enclosing),
            values: HashMap::new(),
        }
    }

    /// Bind `name` in this frame, overwriting any existing binding.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    /// The frame `distance` enclosing links away from `env`, or `None` if
    /// the chain is shorter than that.
    pub fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut environment = Rc::clone(env);
        for _ in 0..distance {
            let enclosing = environment.borrow().enclosing.clone()?;
            environment = enclosing;
        }
        Some(environment)
    }

    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Option<Value> {
        Self::ancestor(env, distance).and_then(|frame| frame.borrow().get(name))
    }

    /// Write `name` in the frame `distance` hops away. Returns false when
    /// the chain is shorter than the requested distance.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
    ) -> bool {
        match Self::ancestor(env, distance) {
            Some(frame) => {
                frame.borrow_mut().define(name, value);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::Environment;
    use crate::interpreter::Value;

    #[test]
    fn test_define_and_get() {
        let mut environment = Environment::new();
        environment.define("foo", Value::Number(1.0));
        assert_eq!(environment.get("foo"), Some(Value::Number(1.0)));
        assert_eq!(environment.get("bar"), None);
    }

    #[test]
    fn test_get_at_walks_the_chain() {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("x", Value::Number(1.0));

        let inner = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &global,
        ))));
        assert_eq!(
            Environment::get_at(&inner, 1, "x"),
            Some(Value::Number(1.0))
        );
        assert_eq!(Environment::get_at(&inner, 0, "x"), None);
        assert_eq!(Environment::get_at(&inner, 2, "x"), None);
    }

    #[test]
    fn test_assign_at_writes_the_right_frame() {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("x", Value::Number(1.0));

        let inner = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
            &global,
        ))));
        assert!(Environment::assign_at(&inner, 1, "x", Value::Number(2.0)));
        assert_eq!(global.borrow().get("x"), Some(Value::Number(2.0)));
        assert!(inner.borrow().get("x").is_none());
    }
}
