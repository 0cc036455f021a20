//! Canonical text rendering of expression trees.
//!
//! A deterministic pure function of the tree: one spelling per operator,
//! parentheses around non-literal children, floats always rendered with `.`
//! as the decimal separator. Serializing, reparsing, and serializing again
//! yields equivalent text.

use thiserror::Error;

use crate::types::{Expr, Literal};

/// Errors produced when rendering an expression tree to text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializeError {
    /// Member and indexer trees have no canonical source form; rendering is
    /// a round-trip and debugging aid, not a universal printer.
    #[error("serialization is not supported for {0} expressions")]
    Unsupported(&'static str),
}

/// Render an expression tree to canonical source text.
///
/// # Errors
///
/// Returns [`SerializeError::Unsupported`] for member and indexer nodes.
pub fn to_text(expr: &Expr) -> Result<String, SerializeError> {
    let mut out = String::new();
    write_expr(expr, &mut out)?;
    trim_spaces(&mut out);
    Ok(out)
}

fn write_expr(expr: &Expr, out: &mut String) -> Result<(), SerializeError> {
    match expr {
        Expr::Value(literal) => {
            match literal {
                Literal::Int(v) => out.push_str(&v.to_string()),
                Literal::Float(v) => out.push_str(&v.to_string()),
                Literal::Str(v) => {
                    out.push('"');
                    out.push_str(v);
                    out.push('"');
                }
            }
            out.push(' ');
            Ok(())
        }
        Expr::Binary { op, left, right } => {
            encapsulate(left, out)?;
            out.push_str(&op.to_string());
            out.push(' ');
            encapsulate(right, out)
        }
        Expr::Unary { op, operand } => {
            out.push_str(&op.to_string());
            encapsulate(operand, out)
        }
        Expr::Ternary {
            condition,
            then,
            otherwise,
        } => {
            encapsulate(condition, out)?;
            out.push_str("? ");
            encapsulate(then, out)?;
            out.push_str(": ");
            encapsulate(otherwise, out)
        }
        Expr::Function { name, args } => {
            out.push_str(name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                write_expr(arg, out)?;
                if i + 1 < args.len() {
                    trim_spaces(out);
                    out.push_str(", ");
                }
            }
            trim_spaces(out);
            out.push_str(") ");
            Ok(())
        }
        Expr::Identifier(name) => {
            out.push('[');
            out.push_str(name);
            out.push_str("] ");
            Ok(())
        }
        Expr::Member { .. } => Err(SerializeError::Unsupported("member")),
        Expr::Indexer { .. } => Err(SerializeError::Unsupported("indexer")),
    }
}

/// Literal children render bare; everything else is parenthesized.
fn encapsulate(expr: &Expr, out: &mut String) -> Result<(), SerializeError> {
    if matches!(expr, Expr::Value(_)) {
        write_expr(expr, out)
    } else {
        out.push('(');
        write_expr(expr, out)?;
        trim_spaces(out);
        out.push_str(") ");
        Ok(())
    }
}

fn trim_spaces(out: &mut String) {
    while out.ends_with(' ') {
        out.pop();
    }
}
