use std::fmt::Display;

use crate::lexer::Token;

/// Identity of an expression node, assigned once at construction.
///
/// The resolver keys its distance side-table by this id, so nodes must never
/// be duplicated or re-parented after parsing.
pub type ExprId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
}

/// An expression node: a unique id plus the actual variant.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal {
        value: LiteralValue,
    },
    Variable {
        name: Token,
    },
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    /// Same shape as `Binary`, but `&`/`|` short-circuit.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        /// The closing parenthesis, kept for error reporting.
        paren: Token,
        arguments: Vec<Expr>,
    },
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LiteralValue::Number(value) => write!(f, "{value}"),
            LiteralValue::String(value) => write!(f, "\"{value}\""),
            LiteralValue::Boolean(value) => write!(f, "{value}"),
            LiteralValue::Nil => f.write_str("nil"),
        }
    }
}

/// Compact structural rendering, used by the debug-level program dump.
impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Literal { value } => write!(f, "{value}"),
            ExprKind::Variable { name } => f.write_str(&name.lexeme),
            ExprKind::Assign { name, value } => write!(f, "(← {} {value})", name.lexeme),
            ExprKind::Unary { operator, right } => write!(f, "({} {right})", operator.lexeme),
            ExprKind::Binary {
                left,
                operator,
                right,
            }
            | ExprKind::Logical {
                left,
                operator,
                right,
            } => write!(f, "({} {left} {right})", operator.lexeme),
            ExprKind::Call {
                callee, arguments, ..
            } => {
                write!(f, "(call {callee}")?;
                for argument in arguments {
                    write!(f, " {argument}")?;
                }
                f.write_str(")")
            }
        }
    }
}
