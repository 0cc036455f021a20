mod compile;
mod evaluate;
mod parse;
mod serialize;
mod types;

pub use compile::CompileCache;
pub use parse::{parse, SyntaxError};
pub use serialize::{to_text, SerializeError};
pub use types::{
    Argument, BinaryOp, Bindings, DynamicAccess, EvalError, Expr, Expression, FunctionArgs,
    FunctionResolver, HostObject, Literal, ObjectBuilder, ObjectResolver, Options, TypeBuilder,
    TypeRef, UnaryOp, Value,
};
