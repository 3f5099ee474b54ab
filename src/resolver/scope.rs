use std::collections::HashMap;

/// Stack of lexical scopes. Each frame maps a name to whether its
/// initializer has finished resolving; the global scope is represented by
/// an empty stack and is deliberately not tracked.
#[derive(Debug, Default)]
pub struct ScopeStack {
    stack: Vec<HashMap<String, bool>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_scope(&mut self) {
        self.stack.push(HashMap::new());
    }

    pub fn end_scope(&mut self) {
        self.stack.pop();
    }

    /// Insert `name` into the innermost scope, marked as not yet defined.
    /// Returns false if the scope already holds the name.
    pub fn declare(&mut self, name: &str) -> bool {
        let Some(scope) = self.stack.last_mut() else {
            return true;
        };
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_owned(), false);
        true
    }

    /// Mark `name` in the innermost scope as fully initialized.
    pub fn define(&mut self, name: &str) {
        if let Some(scope) = self.stack.last_mut() {
            scope.insert(name.to_owned(), true);
        }
    }

    /// True when the innermost scope holds `name` but its initializer is
    /// still being resolved.
    pub fn is_being_initialized(&self, name: &str) -> bool {
        self.stack
            .last()
            .and_then(|scope| scope.get(name))
            .is_some_and(|defined| !defined)
    }

    /// Number of scopes between the innermost one and the scope declaring
    /// `name`; `None` when no active scope holds it (i.e. it is global).
    pub fn depth_of(&self, name: &str) -> Option<usize> {
        self.stack
            .iter()
            .rev()
            .position(|scope| scope.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::ScopeStack;

    #[test]
    fn test_declare_outside_any_scope_is_permitted() {
        let mut scopes = ScopeStack::new();
        assert!(scopes.declare("foo"));
        assert!(scopes.declare("foo"));
        assert_eq!(scopes.depth_of("foo"), None);
    }

    #[test]
    fn test_redeclare_in_same_scope_is_rejected() {
        let mut scopes = ScopeStack::new();
        scopes.begin_scope();
        assert!(scopes.declare("foo"));
        assert!(!scopes.declare("foo"));
    }

    #[test]
    fn test_depth_counts_scope_hops() {
        let mut scopes = ScopeStack::new();
        scopes.begin_scope();
        scopes.declare("outer");
        scopes.define("outer");
        scopes.begin_scope();
        scopes.declare("inner");
        scopes.define("inner");

        assert_eq!(scopes.depth_of("inner"), Some(0));
        assert_eq!(scopes.depth_of("outer"), Some(1));
        assert_eq!(scopes.depth_of("missing"), None);

        scopes.end_scope();
        assert_eq!(scopes.depth_of("inner"), None);
        assert_eq!(scopes.depth_of("outer"), Some(0));
    }

    #[test]
    fn test_initialization_tracking() {
        let mut scopes = ScopeStack::new();
        scopes.begin_scope();
        scopes.declare("foo");
        assert!(scopes.is_being_initialized("foo"));
        scopes.define("foo");
        assert!(!scopes.is_being_initialized("foo"));
    }
}
