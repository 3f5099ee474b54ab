//! Static pre-pass over the AST that records, for every local variable
//! reference, how many scopes lie between the reference and its binding.
//!
//! References with no entry in the resulting side-table are globals and get
//! looked up in the global frame at runtime.

mod scope;

use std::collections::HashMap;
use std::{error::Error, fmt::Display};

use crate::lexer::Token;
use crate::parser::ast::{Expr, ExprId, ExprKind, FunctionDecl, Stmt};

use self::scope::ScopeStack;

/// Side-table from expression identity to scope distance.
pub type Locals = HashMap<ExprId, usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    pub message: String,
    pub line: usize,
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at line {}.", self.message, self.line)
    }
}

impl Error for ResolveError {}

#[derive(Default)]
pub struct Resolver {
    scopes: ScopeStack,
    locals: Locals,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walk the program in source order. The first error is fatal; a
    /// program that fails to resolve is never executed.
    pub fn resolve(mut self, statements: &[Stmt]) -> Result<Locals, ResolveError> {
        self.resolve_statements(statements)?;
        Ok(self.locals)
    }

    fn resolve_statements(&mut self, statements: &[Stmt]) -> Result<(), ResolveError> {
        for statement in statements {
            self.resolve_statement(statement)?;
        }
        Ok(())
    }

    fn resolve_statement(&mut self, statement: &Stmt) -> Result<(), ResolveError> {
        match statement {
            Stmt::Expression { expression } | Stmt::Print { expression } => {
                self.resolve_expression(expression)
            }
            Stmt::Var { name, initializer } => {
                self.declare(name)?;
                if let Some(initializer) = initializer {
                    self.resolve_expression(initializer)?;
                }
                self.scopes.define(&name.lexeme);
                Ok(())
            }
            Stmt::Block { statements } => {
                self.scopes.begin_scope();
                let result = self.resolve_statements(statements);
                self.scopes.end_scope();
                result
            }
            Stmt::If {
                condition,
                then_branch,
            } => {
                self.resolve_expression(condition)?;
                self.resolve_statement(then_branch)
            }
            Stmt::Loop { body } => self.resolve_statement(body),
            Stmt::Break { .. } => Ok(()),
            Stmt::Function { declaration } => {
                // Declared and defined up front, so the body may recurse.
                self.declare(&declaration.name)?;
                self.scopes.define(&declaration.name.lexeme);
                self.resolve_function(declaration)
            }
            Stmt::Return { value, .. } => self.resolve_expression(value),
        }
    }

    fn resolve_function(&mut self, declaration: &FunctionDecl) -> Result<(), ResolveError> {
        self.scopes.begin_scope();
        for param in &declaration.params {
            self.declare(param)?;
            self.scopes.define(&param.lexeme);
        }
        let result = self.resolve_statements(&declaration.body);
        self.scopes.end_scope();
        result
    }

    fn resolve_expression(&mut self, expression: &Expr) -> Result<(), ResolveError> {
        match &expression.kind {
            ExprKind::Literal { .. } => Ok(()),
            ExprKind::Variable { name } => {
                if self.scopes.is_being_initialized(&name.lexeme) {
                    return Err(ResolveError {
                        message: "Can't read local variable in its own initializer".into(),
                        line: name.line,
                    });
                }
                self.resolve_local(expression.id, name);
                Ok(())
            }
            ExprKind::Assign { name, value } => {
                self.resolve_expression(value)?;
                self.resolve_local(expression.id, name);
                Ok(())
            }
            ExprKind::Unary { right, .. } => self.resolve_expression(right),
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                self.resolve_expression(left)?;
                self.resolve_expression(right)
            }
            ExprKind::Call {
                callee, arguments, ..
            } => {
                self.resolve_expression(callee)?;
                for argument in arguments {
                    self.resolve_expression(argument)?;
                }
                Ok(())
            }
        }
    }

    fn resolve_local(&mut self, id: ExprId, name: &Token) {
        if let Some(depth) = self.scopes.depth_of(&name.lexeme) {
            self.locals.insert(id, depth);
        }
    }

    fn declare(&mut self, name: &Token) -> Result<(), ResolveError> {
        if !self.scopes.declare(&name.lexeme) {
            return Err(ResolveError {
                message: format!("Variable '{}' already declared in this scope", name.lexeme),
                line: name.line,
            });
        }
        Ok(())
    }
}
