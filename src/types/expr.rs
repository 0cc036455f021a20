use std::fmt;

use super::error::EvalError;
use super::value::Value;

/// Binary operators supported in formula expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Times,
    Div,
    Modulo,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

/// Unary operators supported in formula expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    BitNot,
}

/// A literal payload carried by [`Expr::Value`].
///
/// The literal set is deliberately narrow: integers, floats, and strings.
/// Booleans and richer values only arise at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Formula expression AST.
///
/// Trees are immutable once built and uniquely own their children. Compiled
/// trees are shared between facades (and threads) behind `Arc`, so nothing in
/// here is ever written during evaluation; per-pass state such as namespace
/// tracking lives in the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Value(Literal),
    Identifier(String),
    /// `left.right` where `right` is an Identifier, Function, or Indexer.
    Member {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `left[index]`.
    Indexer {
        left: Box<Expr>,
        index: Box<Expr>,
    },
    Function {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    #[must_use]
    pub fn value(literal: impl Into<Literal>) -> Expr {
        Expr::Value(literal.into())
    }

    #[must_use]
    pub fn identifier(name: &str) -> Expr {
        Expr::Identifier(name.to_owned())
    }

    #[must_use]
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    #[must_use]
    pub fn ternary(condition: Expr, then: Expr, otherwise: Expr) -> Expr {
        Expr::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    #[must_use]
    pub fn function(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Function {
            name: name.to_owned(),
            args,
        }
    }

    #[must_use]
    pub fn member(left: Expr, right: Expr) -> Expr {
        Expr::Member {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[must_use]
    pub fn indexer(left: Expr, index: Expr) -> Expr {
        Expr::Indexer {
            left: Box::new(left),
            index: Box::new(index),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Div => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
            UnaryOp::BitNot => "~",
        })
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(i64::from(v))
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Str(v.to_owned())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Str(v)
    }
}

impl TryFrom<&Value> for Literal {
    type Error = EvalError;

    /// Only integer, float, and string values have a literal form.
    fn try_from(value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Int(v) => Ok(Literal::Int(*v)),
            Value::Float(v) => Ok(Literal::Float(*v)),
            Value::String(v) => Ok(Literal::Str(v.clone())),
            other => Err(EvalError::UnsupportedLiteralType(other.kind())),
        }
    }
}
