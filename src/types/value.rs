use std::cmp::Ordering;
use std::fmt;

use super::error::EvalError;
use super::expr::{BinaryOp, UnaryOp};
use super::object::{HostObject, TypeRef};

/// A dynamically typed value flowing through evaluation.
///
/// `Null` is the evaluator's starting result and what a function call that no
/// resolver handled leaves behind. `Object` and `TypeRef` are cheap handles;
/// cloning a value never copies host state.
#[derive(Clone)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    List(Vec<Value>),
    Object(HostObject),
    TypeRef(TypeRef),
}

/// Comparison representation picked by [`Value::compare`]: the first kind in
/// this order matching either operand wins. Variant order is the preference
/// order, so the derived `Ord` makes "more precise" compare smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CmpKind {
    Str,
    Float,
    Int,
    Bool,
}

impl Value {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::TypeRef(_) => "type",
        }
    }

    /// Boolean coercion: booleans as-is, numbers by zero test, strings parsed
    /// case-insensitively as "true"/"false", null falsy.
    pub(crate) fn coerce_bool(&self) -> Result<bool, String> {
        match self {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Int(v) => Ok(*v != 0),
            Value::Float(v) => Ok(*v != 0.0),
            Value::String(s) => {
                if s.eq_ignore_ascii_case("true") {
                    Ok(true)
                } else if s.eq_ignore_ascii_case("false") {
                    Ok(false)
                } else {
                    Err(format!("string \"{s}\" is not a boolean"))
                }
            }
            other => Err(format!("{} is not convertible to boolean", other.kind())),
        }
    }

    /// Apply a binary operator to two already-evaluated operands.
    ///
    /// Short-circuiting for And/Or happens in the evaluator before this is
    /// reached; by the time And/Or land here both sides are present.
    pub(crate) fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        let fail = |message: String| EvalError::Operator {
            op: op.to_string(),
            message,
        };

        match op {
            BinaryOp::And => {
                let l = left.coerce_bool().map_err(&fail)?;
                let r = right.coerce_bool().map_err(&fail)?;
                Ok(Value::Bool(l && r))
            }
            BinaryOp::Or => {
                let l = left.coerce_bool().map_err(&fail)?;
                let r = right.coerce_bool().map_err(&fail)?;
                Ok(Value::Bool(l || r))
            }
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => {
                let ord = Value::compare(left, right).map_err(&fail)?;
                Ok(Value::Bool(match op {
                    BinaryOp::Eq => ord == Ordering::Equal,
                    BinaryOp::NotEq => ord != Ordering::Equal,
                    BinaryOp::Lt => ord == Ordering::Less,
                    BinaryOp::LtEq => ord != Ordering::Greater,
                    BinaryOp::Gt => ord == Ordering::Greater,
                    _ => ord != Ordering::Less,
                }))
            }
            BinaryOp::Plus => match (left, right) {
                (Value::String(_), _) | (_, Value::String(_)) => {
                    Ok(Value::String(format!("{left}{right}")))
                }
                (Value::Int(a), Value::Int(b)) => a
                    .checked_add(*b)
                    .map(Value::Int)
                    .ok_or_else(|| fail("integer overflow".to_owned())),
                _ => numeric_pair(left, right)
                    .map(|(a, b)| Value::Float(a + b))
                    .map_err(&fail),
            },
            BinaryOp::Minus => match (left, right) {
                (Value::Int(a), Value::Int(b)) => a
                    .checked_sub(*b)
                    .map(Value::Int)
                    .ok_or_else(|| fail("integer overflow".to_owned())),
                _ => numeric_pair(left, right)
                    .map(|(a, b)| Value::Float(a - b))
                    .map_err(&fail),
            },
            BinaryOp::Times => match (left, right) {
                (Value::Int(a), Value::Int(b)) => a
                    .checked_mul(*b)
                    .map(Value::Int)
                    .ok_or_else(|| fail("integer overflow".to_owned())),
                _ => numeric_pair(left, right)
                    .map(|(a, b)| Value::Float(a * b))
                    .map_err(&fail),
            },
            // Integer pairs always produce a floating quotient.
            BinaryOp::Div => numeric_pair(left, right)
                .map(|(a, b)| Value::Float(a / b))
                .map_err(&fail),
            BinaryOp::Modulo => match (left, right) {
                (Value::Int(a), Value::Int(b)) => a
                    .checked_rem(*b)
                    .map(Value::Int)
                    .ok_or_else(|| fail("division by zero".to_owned())),
                _ => numeric_pair(left, right)
                    .map(|(a, b)| Value::Float(a % b))
                    .map_err(&fail),
            },
            BinaryOp::BitAnd => match (left, right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a & b)),
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a & b)),
                _ => Err(fail(bit_mismatch(left, right))),
            },
            BinaryOp::BitOr => match (left, right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a | b)),
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a | b)),
                _ => Err(fail(bit_mismatch(left, right))),
            },
            BinaryOp::BitXor => match (left, right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a ^ b)),
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(a ^ b)),
                _ => Err(fail(bit_mismatch(left, right))),
            },
            // Shift counts are masked to the word size.
            BinaryOp::Shl => match (left, right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a << (b & 63))),
                _ => Err(fail(bit_mismatch(left, right))),
            },
            BinaryOp::Shr => match (left, right) {
                (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a >> (b & 63))),
                _ => Err(fail(bit_mismatch(left, right))),
            },
        }
    }

    /// Apply a unary operator to an already-evaluated operand.
    pub(crate) fn unary(op: UnaryOp, operand: &Value) -> Result<Value, EvalError> {
        let fail = |message: String| EvalError::Operator {
            op: op.to_string(),
            message,
        };
        match op {
            UnaryOp::Not => operand.coerce_bool().map(|b| Value::Bool(!b)).map_err(fail),
            UnaryOp::Negate => match operand {
                Value::Int(v) => v
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| fail("integer overflow".to_owned())),
                Value::Float(v) => Ok(Value::Float(-v)),
                other => Err(fail(format!("cannot negate {}", other.kind()))),
            },
            UnaryOp::BitNot => match operand {
                Value::Int(v) => Ok(Value::Int(!v)),
                other => Err(fail(format!("cannot complement {}", other.kind()))),
            },
        }
    }

    /// Order two values under their most precise shared representation:
    /// string, then float, then integer, then boolean — the first kind in
    /// that order matching either operand decides how both are converted.
    fn compare(left: &Value, right: &Value) -> Result<Ordering, String> {
        let kind = comparison_kind(left, right).ok_or_else(|| {
            format!(
                "{} and {} are not comparable",
                left.kind(),
                right.kind()
            )
        })?;
        match kind {
            CmpKind::Str => Ok(left.comparison_string()?.cmp(&right.comparison_string()?)),
            CmpKind::Float => {
                let a = left.comparison_float()?;
                let b = right.comparison_float()?;
                a.partial_cmp(&b)
                    .ok_or_else(|| "values are unordered".to_owned())
            }
            CmpKind::Int => Ok(left.comparison_int()?.cmp(&right.comparison_int()?)),
            CmpKind::Bool => {
                let a = left.coerce_bool()?;
                let b = right.coerce_bool()?;
                Ok(a.cmp(&b))
            }
        }
    }

    fn comparison_string(&self) -> Result<String, String> {
        match self {
            Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::String(_) => {
                Ok(self.to_string())
            }
            other => Err(format!("cannot convert {} to string", other.kind())),
        }
    }

    fn comparison_float(&self) -> Result<f64, String> {
        match self {
            Value::Int(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            Value::Bool(b) => Ok(f64::from(u8::from(*b))),
            other => Err(format!("cannot convert {} to float", other.kind())),
        }
    }

    fn comparison_int(&self) -> Result<i64, String> {
        match self {
            Value::Int(v) => Ok(*v),
            Value::Bool(b) => Ok(i64::from(*b)),
            other => Err(format!("cannot convert {} to integer", other.kind())),
        }
    }
}

fn comparison_kind(a: &Value, b: &Value) -> Option<CmpKind> {
    let of = |v: &Value| match v {
        Value::String(_) => Some(CmpKind::Str),
        Value::Float(_) => Some(CmpKind::Float),
        Value::Int(_) => Some(CmpKind::Int),
        Value::Bool(_) => Some(CmpKind::Bool),
        _ => None,
    };
    match (of(a), of(b)) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Promote an arithmetic operand pair to floats. Only integers and floats
/// are numeric here; booleans count solely in comparisons.
fn numeric_pair(a: &Value, b: &Value) -> Result<(f64, f64), String> {
    let to_f64 = |v: &Value| match v {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        other => Err(format!("{} is not numeric", other.kind())),
    };
    Ok((to_f64(a)?, to_f64(b)?))
}

fn bit_mismatch(a: &Value, b: &Value) -> String {
    format!("cannot apply to {} and {}", a.kind(), b.kind())
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.same(b),
            (Value::TypeRef(a), Value::TypeRef(b)) => a.same(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Int(v) => write!(f, "Int({v})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::String(v) => write!(f, "String({v:?})"),
            Value::List(v) => f.debug_tuple("List").field(v).finish(),
            Value::Object(_) => f.write_str("Object(..)"),
            Value::TypeRef(t) => write!(f, "TypeRef({})", t.name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(_) => f.write_str("<object>"),
            Value::TypeRef(t) => write!(f, "<type {}>", t.name()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<HostObject> for Value {
    fn from(v: HostObject) -> Self {
        Value::Object(v)
    }
}

impl From<TypeRef> for Value {
    fn from(v: TypeRef) -> Self {
        Value::TypeRef(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
