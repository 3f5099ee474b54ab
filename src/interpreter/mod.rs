//! Tree-walking evaluator with a chained environment model.
//!
//! `break` and `return` travel as an explicit unwind value in the error
//! position of statement execution; a loop consumes breaks, a call frame
//! consumes returns, and anything that escapes to the top level is a
//! runtime error.

mod callable;
mod environment;
mod value;

pub use callable::Function;
pub use environment::Environment;
pub use value::Value;

use std::io::{self, Write};
use std::{cell::RefCell, rc::Rc};
use std::{error::Error, fmt::Display};

use crate::lexer::{Token, TokenKind};
use crate::parser::ast::{Expr, ExprId, ExprKind, Stmt};
use crate::resolver::Locals;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError {
    pub message: String,
    pub line: Option<usize>,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} at line {}.", self.message, line),
            None => write!(f, "{}.", self.message),
        }
    }
}

impl Error for RuntimeError {}

/// Non-local exit from statement execution.
pub(crate) enum Unwind {
    Break { line: usize },
    Return { value: Value, line: usize },
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

pub struct Interpreter<W> {
    globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: Locals,
    current_value: Value,
    out: W,
}

impl Interpreter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl Default for Interpreter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Interpreter<W> {
    /// Build an interpreter that writes `✉` output to `out`.
    pub fn with_output(out: W) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: Locals::new(),
            current_value: Value::Nil,
            out,
        }
    }

    /// Recover the output sink, e.g. to inspect what a test program printed.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Execute a resolved program. Returns the value of the last evaluated
    /// expression statement.
    pub fn interpret(&mut self, statements: &[Stmt], locals: Locals) -> Result<Value, RuntimeError> {
        self.locals = locals;

        for statement in statements {
            if let Err(unwind) = self.execute(statement) {
                return Err(match unwind {
                    Unwind::Break { line } => {
                        RuntimeError::at_line("Cannot break outside of a loop", line)
                    }
                    Unwind::Return { line, .. } => {
                        RuntimeError::at_line("Cannot return from top-level code", line)
                    }
                    Unwind::Error(error) => error,
                });
            }
        }

        Ok(self.current_value.clone())
    }

    fn execute(&mut self, statement: &Stmt) -> Result<(), Unwind> {
        match statement {
            Stmt::Expression { expression } => {
                self.current_value = self.evaluate(expression)?;
            }
            Stmt::Print { expression } => {
                let value = self.evaluate(expression)?;
                writeln!(self.out, "{value}")
                    .map_err(|error| RuntimeError::new(format!("Could not write output: {error}")))?;
                self.current_value = value;
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expression) => self.evaluate(expression)?,
                    None => Value::Nil,
                };
                self.environment
                    .borrow_mut()
                    .define(name.lexeme.clone(), value);
            }
            Stmt::Block { statements } => {
                let environment = Environment::with_enclosing(Rc::clone(&self.environment));
                self.execute_block(statements, Rc::new(RefCell::new(environment)))?;
            }
            Stmt::If {
                condition,
                then_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)?;
                }
            }
            Stmt::Loop { body } => loop {
                match self.execute(body) {
                    Err(Unwind::Break { .. }) => break,
                    other => other?,
                }
            },
            Stmt::Break { keyword } => {
                return Err(Unwind::Break {
                    line: keyword.line,
                })
            }
            Stmt::Function { declaration } => {
                let function =
                    Function::new(Rc::clone(declaration), Rc::clone(&self.environment));
                self.environment.borrow_mut().define(
                    declaration.name.lexeme.clone(),
                    Value::Function(Rc::new(function)),
                );
            }
            Stmt::Return { keyword, value } => {
                let value = self.evaluate(value)?;
                return Err(Unwind::Return {
                    value,
                    line: keyword.line,
                });
            }
        }

        Ok(())
    }

    /// Run `statements` with `environment` as the current frame, restoring
    /// the previous frame on every exit path, unwinds included.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<RefCell<Environment>>,
    ) -> Result<(), Unwind> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(());
        for statement in statements {
            result = self.execute(statement);
            if result.is_err() {
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expression: &Expr) -> Result<Value, RuntimeError> {
        match &expression.kind {
            ExprKind::Literal { value } => Ok(value.into()),
            ExprKind::Variable { name } => self.look_up_variable(expression.id, name),
            ExprKind::Assign { name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(&expression.id) {
                    Some(&distance) => {
                        if !Environment::assign_at(
                            &self.environment,
                            distance,
                            &name.lexeme,
                            value.clone(),
                        ) {
                            return Err(RuntimeError::at_line(
                                format!("Undefined variable '{}'", name.lexeme),
                                name.line,
                            ));
                        }
                    }
                    None => {
                        self.globals
                            .borrow_mut()
                            .define(name.lexeme.clone(), value.clone());
                    }
                }
                Ok(value)
            }
            ExprKind::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.kind {
                    TokenKind::Bang => Ok(Value::Boolean(!right.is_truthy())),
                    TokenKind::Minus => match right {
                        Value::Number(value) => Ok(Value::Number(-value)),
                        value => Err(RuntimeError::at_line(
                            format!("Operand must be a number, got {value}"),
                            operator.line,
                        )),
                    },
                    kind => unreachable!("not a unary operator: {kind:?}"),
                }
            }
            ExprKind::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                binary(left, operator, right)
            }
            ExprKind::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                // Short-circuit: hand back the raw operand, not a boolean.
                match operator.kind {
                    TokenKind::Or if left.is_truthy() => Ok(left),
                    TokenKind::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate(right),
                }
            }
            ExprKind::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut evaluated = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    evaluated.push(self.evaluate(argument)?);
                }

                let Value::Function(function) = callee else {
                    return Err(RuntimeError::at_line(
                        format!("Can only call functions, got {callee}"),
                        paren.line,
                    ));
                };

                if evaluated.len() != function.arity() {
                    return Err(RuntimeError::at_line(
                        format!(
                            "Expected {} arguments but got {}",
                            function.arity(),
                            evaluated.len()
                        ),
                        paren.line,
                    ));
                }

                function.call(self, evaluated)
            }
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token) -> Result<Value, RuntimeError> {
        let value = match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme),
            None => self.globals.borrow().get(&name.lexeme),
        };

        value.ok_or_else(|| {
            RuntimeError::at_line(format!("Undefined variable '{}'", name.lexeme), name.line)
        })
    }
}

/// Binary operator dispatch on already-evaluated operands.
fn binary(left: Value, operator: &Token, right: Value) -> Result<Value, RuntimeError> {
    match operator.kind {
        TokenKind::Equal => Ok(Value::Boolean(left == right)),
        TokenKind::NotEqual => Ok(Value::Boolean(left != right)),
        TokenKind::Plus => match (left, right) {
            (Value::Number(left), Value::Number(right)) => Ok(Value::Number(left + right)),
            (Value::String(left), Value::String(right)) => Ok(Value::String(left + &right)),
            (left, right) => Err(RuntimeError::at_line(
                format!("Operands must be two numbers or two strings, got {left} and {right}"),
                operator.line,
            )),
        },
        _ => {
            let (Value::Number(left), Value::Number(right)) = (&left, &right) else {
                return Err(RuntimeError::at_line(
                    format!("Operands must be two numbers, got {left} and {right}"),
                    operator.line,
                ));
            };

            Ok(match operator.kind {
                TokenKind::Minus => Value::Number(left - right),
                TokenKind::Divide => Value::Number(left / right),
                TokenKind::Multiply => Value::Number(left * right),
                TokenKind::Greater => Value::Boolean(left > right),
                TokenKind::GreaterEqual => Value::Boolean(left >= right),
                TokenKind::Less => Value::Boolean(left < right),
                TokenKind::LessEqual => Value::Boolean(left <= right),
                kind => unreachable!("not a binary operator: {kind:?}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use crate::resolver::Resolver;

    fn eval(source: &str) -> Result<Value, RuntimeError> {
        let (tokens, errors) = Lexer::new(source).scan_tokens();
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        let statements = Parser::new(tokens).parse().expect("expected a clean parse");
        let locals = Resolver::new().resolve(&statements).expect("resolves");
        Interpreter::with_output(Vec::new()).interpret(&statements, locals)
    }

    #[test]
    fn test_arithmetic_result() {
        assert_eq!(eval("1 + 2 × 3;"), Ok(Value::Number(7.0)));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval("\"foo\" + \"bar\";"), Ok(Value::String("foobar".into())));
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        assert_eq!(eval("1 ÷ 0;"), Ok(Value::Number(f64::INFINITY)));
    }

    #[test]
    fn test_equality_mixes_types() {
        assert_eq!(eval("ø = ø;"), Ok(Value::Boolean(true)));
        assert_eq!(eval("ø = 0;"), Ok(Value::Boolean(false)));
        assert_eq!(eval("1 ≠ \"1\";"), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_unary() {
        assert_eq!(eval("!ø;"), Ok(Value::Boolean(true)));
        assert_eq!(eval("!0;"), Ok(Value::Boolean(false)));
        assert_eq!(eval("-(1 + 2);"), Ok(Value::Number(-3.0)));
    }

    #[test]
    fn test_logical_returns_raw_operand() {
        assert_eq!(eval("ø | \"fallback\";"), Ok(Value::String("fallback".into())));
        assert_eq!(eval("1 & 2;"), Ok(Value::Number(2.0)));
        assert_eq!(eval("○ & 2;"), Ok(Value::Boolean(false)));
    }

    #[test]
    fn test_type_error_mentions_operands_and_line() {
        let error = eval("\n1 + ●;").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Operands must be two numbers or two strings, got 1 and true at line 2."
        );
    }

    #[test]
    fn test_undefined_variable() {
        let error = eval("✉ ghost;").unwrap_err();
        assert_eq!(error.to_string(), "Undefined variable 'ghost' at line 1.");
    }

    #[test]
    fn test_arity_mismatch() {
        let error = eval("ƒ f(a) { ↵ a; } f();").unwrap_err();
        assert_eq!(error.to_string(), "Expected 1 arguments but got 0 at line 1.");
    }

    #[test]
    fn test_calling_a_number_fails() {
        let error = eval("• x ← 1; x();").unwrap_err();
        assert_eq!(error.to_string(), "Can only call functions, got 1 at line 1.");
    }

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(eval("ƒ noop() { 1 + 1; } noop();"), Ok(Value::Nil));
    }

    #[test]
    fn test_break_outside_loop_is_a_runtime_error() {
        let error = eval("ƒ f() { Ɵ; } f();").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot break outside of a loop at line 1."
        );
    }

    #[test]
    fn test_return_at_top_level_is_a_runtime_error() {
        let error = eval("↵ 1;").unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot return from top-level code at line 1."
        );
    }

    #[test]
    fn test_program_result_is_last_expression_value() {
        assert_eq!(eval("1 + 1; 2 × 2;"), Ok(Value::Number(4.0)));
    }
}
