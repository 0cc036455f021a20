mod bindings;
mod error;
mod expr;
mod expression;
mod host;
mod object;
mod options;
mod value;

pub use bindings::Bindings;
pub use error::EvalError;
pub use expr::{BinaryOp, Expr, Literal, UnaryOp};
pub use expression::Expression;
pub use host::{Argument, FunctionArgs, FunctionResolver, ObjectResolver};
pub use object::{DynamicAccess, HostObject, ObjectBuilder, TypeBuilder, TypeRef};
pub use options::Options;
pub use value::Value;
