use std::fmt;
use std::io::Write;
use std::{cell::RefCell, rc::Rc};

use crate::parser::ast::FunctionDecl;

use super::environment::Environment;
use super::value::Value;
use super::{Interpreter, RuntimeError, Unwind};

/// A user-declared function paired with the environment that was current
/// when its declaration executed (its closure).
pub struct Function {
    declaration: Rc<FunctionDecl>,
    closure: Rc<RefCell<Environment>>,
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: Rc<RefCell<Environment>>) -> Self {
        Self {
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Invoke with already-evaluated arguments. The call frame's enclosing
    /// link is the closure, not the caller's environment; that is what
    /// makes scoping lexical.
    pub fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<W>,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        let mut environment = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(param.lexeme.clone(), argument);
        }

        let frame = Rc::new(RefCell::new(environment));
        match interpreter.execute_block(&self.declaration.body, frame) {
            // No return signal: the body's value is nil, never the last
            // expression.
            Ok(()) => Ok(Value::Nil),
            Err(Unwind::Return { value, .. }) => Ok(value),
            Err(Unwind::Break { line }) => Err(RuntimeError::at_line(
                "Cannot break outside of a loop",
                line,
            )),
            Err(Unwind::Error(error)) => Err(error),
        }
    }
}

// The closure chain can point back at the function value itself, so the
// derived Debug impl would recurse forever.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ƒ {}>", self.name())
    }
}
