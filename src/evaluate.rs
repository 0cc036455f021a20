//! The tree-walking evaluator.
//!
//! One evaluator visits one tree on one thread. All per-pass state lives
//! here — most importantly the namespace flag that a `Member` node reads
//! right after visiting its left side to decide between extending a dotted
//! path and treating the value as a concrete host object.

use std::mem;

use crate::types::{
    Bindings, BinaryOp, EvalError, Expr, FunctionArgs, FunctionResolver, Literal, ObjectResolver,
    Options, Value,
};

/// Everything an evaluation pass borrows from its facade.
#[derive(Clone, Copy)]
pub(crate) struct EvalEnv<'a> {
    pub(crate) parameters: &'a Bindings,
    pub(crate) functions: Option<&'a FunctionResolver>,
    pub(crate) objects: Option<&'a ObjectResolver>,
    pub(crate) options: Options,
}

pub(crate) struct Evaluator<'a> {
    env: EvalEnv<'a>,
    result: Value,
    /// True when the value in `result` is an unresolved dotted path eligible
    /// for namespace extension by a parent member node.
    namespace: bool,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(env: EvalEnv<'a>) -> Self {
        Evaluator {
            env,
            result: Value::Null,
            namespace: false,
        }
    }

    pub(crate) fn run(
        &mut self,
        expr: &'a Expr,
        context: Option<&Bindings>,
    ) -> Result<Value, EvalError> {
        self.eval(expr, context)?;
        Ok(mem::take(&mut self.result))
    }

    fn eval(&mut self, expr: &'a Expr, context: Option<&Bindings>) -> Result<(), EvalError> {
        // Each node decides its own flag; only identifiers and members set it.
        self.namespace = false;

        match expr {
            Expr::Value(literal) => {
                self.result = match literal {
                    Literal::Int(v) => Value::Int(*v),
                    Literal::Float(v) => Value::Float(*v),
                    Literal::Str(v) => Value::String(v.clone()),
                };
                Ok(())
            }

            // A bound parameter resolves to its value. Otherwise the result
            // is the bare name either way; only the namespace flag records
            // whether the object resolver knew it. The parent member node is
            // the sole consumer of that distinction.
            Expr::Identifier(name) => {
                if let Some(value) = self.env.parameters.get(name) {
                    self.result = value.clone();
                } else {
                    let hit = self
                        .env
                        .objects
                        .is_some_and(|resolve| resolve(name).is_some());
                    self.namespace = !hit;
                    self.result = Value::String(name.clone());
                }
                Ok(())
            }

            Expr::Binary { op, left, right } => {
                self.eval(left, context)?;

                // Short-circuit without visiting the right side.
                if *op == BinaryOp::And || *op == BinaryOp::Or {
                    let lhs = self.result.coerce_bool().map_err(|message| {
                        EvalError::Operator {
                            op: op.to_string(),
                            message,
                        }
                    })?;
                    if *op == BinaryOp::And && !lhs {
                        self.result = Value::Bool(false);
                        self.namespace = false;
                        return Ok(());
                    }
                    if *op == BinaryOp::Or && lhs {
                        self.result = Value::Bool(true);
                        self.namespace = false;
                        return Ok(());
                    }
                }

                let lhs = mem::take(&mut self.result);
                self.eval(right, context)?;
                let rhs = mem::take(&mut self.result);
                self.result = Value::binary(*op, &lhs, &rhs)?;
                self.namespace = false;
                Ok(())
            }

            Expr::Unary { op, operand } => {
                self.eval(operand, context)?;
                let value = mem::take(&mut self.result);
                self.result = Value::unary(*op, &value)?;
                self.namespace = false;
                Ok(())
            }

            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => {
                self.eval(condition, context)?;
                let taken = self
                    .result
                    .coerce_bool()
                    .map_err(|message| EvalError::Operator {
                        op: "?:".to_owned(),
                        message,
                    })?;
                // Exactly one branch is ever visited.
                if taken {
                    self.eval(then, context)
                } else {
                    self.eval(otherwise, context)
                }
            }

            Expr::Function { name, args } => self.call_function(name, args, None, context),

            Expr::Member { left, right } => {
                self.eval(left, context)?;

                // Only identifier and member nodes can leave an open path.
                let open_path = self.namespace
                    && matches!(left.as_ref(), Expr::Identifier(_) | Expr::Member { .. });
                if open_path {
                    let path = match mem::take(&mut self.result) {
                        Value::String(s) => s,
                        other => {
                            return Err(EvalError::UnresolvedNamespace {
                                path: other.to_string(),
                            })
                        }
                    };
                    self.namespace = false;
                    match right.as_ref() {
                        Expr::Identifier(name) => {
                            let qualified = format!("{path}.{name}");
                            match self.env.objects.and_then(|resolve| resolve(&qualified)) {
                                Some(value) => self.result = value,
                                None => {
                                    // Still unresolved: keep extending.
                                    self.result = Value::String(qualified);
                                    self.namespace = true;
                                }
                            }
                            Ok(())
                        }
                        Expr::Function { name, args } => {
                            self.call_function(name, args, Some(&path), context)
                        }
                        _ => Err(EvalError::UnresolvedNamespace { path }),
                    }
                } else {
                    let target = mem::take(&mut self.result);
                    match right.as_ref() {
                        Expr::Function { name, args } => {
                            // Member calls evaluate their arguments eagerly.
                            let mut values = Vec::with_capacity(args.len());
                            for arg in args {
                                self.eval(arg, context)?;
                                values.push(mem::take(&mut self.result));
                            }
                            self.result = invoke_member(&target, name, &values)?;
                            self.namespace = false;
                            Ok(())
                        }
                        Expr::Identifier(name) => {
                            self.result = get_member(&target, name)?;
                            self.namespace = false;
                            Ok(())
                        }
                        Expr::Indexer { left: inner, index } => {
                            // `obj.items[i]`: resolve the named member, then
                            // index its value.
                            let member = match inner.as_ref() {
                                Expr::Identifier(name) => get_member(&target, name)?,
                                _ => {
                                    return Err(EvalError::UnresolvedNamespace {
                                        path: target.to_string(),
                                    })
                                }
                            };
                            self.eval(index, context)?;
                            let idx = mem::take(&mut self.result);
                            self.result = indexed_get(&member, &idx)?;
                            self.namespace = false;
                            Ok(())
                        }
                        _ => Err(EvalError::UnresolvedNamespace {
                            path: target.to_string(),
                        }),
                    }
                }
            }

            Expr::Indexer { left, index } => {
                self.eval(left, context)?;
                let target = mem::take(&mut self.result);
                self.eval(index, context)?;
                let idx = mem::take(&mut self.result);
                self.result = indexed_get(&target, &idx)?;
                self.namespace = false;
                Ok(())
            }
        }
    }

    /// Dispatch a function call through the host resolver.
    ///
    /// Arguments are wrapped, not evaluated; the resolver forces the ones it
    /// needs. An unhandled call (no result written) leaves the previous
    /// result in place.
    fn call_function(
        &mut self,
        name: &str,
        args: &'a [Expr],
        namespace: Option<&str>,
        context: Option<&Bindings>,
    ) -> Result<(), EvalError> {
        let mut function_args = FunctionArgs::new(args, self.env);
        let dispatch = match namespace {
            Some(ns) => format!("{ns}.{name}"),
            None => name.to_owned(),
        };
        if let Some(resolve) = self.env.functions {
            resolve(&dispatch, &mut function_args, context)?;
        }
        if let Some(value) = function_args.take_result() {
            self.result = value;
        }
        self.namespace = false;
        Ok(())
    }
}

fn target_name(value: &Value) -> String {
    match value {
        Value::TypeRef(t) => format!("type {}", t.name()),
        other => other.kind().to_owned(),
    }
}

/// Property-then-field lookup, with the dynamic capability probed first.
fn get_member(target: &Value, name: &str) -> Result<Value, EvalError> {
    let not_found = || EvalError::MemberNotFound {
        name: name.to_owned(),
        target: target_name(target),
    };
    match target {
        Value::Object(obj) => {
            if let Some(dynamic) = obj.dynamic() {
                if let Some(value) = dynamic.try_get_member(name) {
                    return Ok(value);
                }
            }
            obj.members()
                .property_or_field(name)
                .ok_or_else(not_found)
        }
        Value::TypeRef(t) => t.members().property_or_field(name).ok_or_else(not_found),
        _ => Err(not_found()),
    }
}

/// Method dispatch: dynamic probe first, then the first structural entry
/// matching name and argument count.
fn invoke_member(target: &Value, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let not_found = || EvalError::MemberNotFound {
        name: name.to_owned(),
        target: target_name(target),
    };
    match target {
        Value::Object(obj) => {
            if let Some(dynamic) = obj.dynamic() {
                if let Some(value) = dynamic.try_invoke_member(name, args) {
                    return Ok(value);
                }
            }
            obj.members().invoke(name, args).unwrap_or_else(|| Err(not_found()))
        }
        Value::TypeRef(t) => t.members().invoke(name, args).unwrap_or_else(|| Err(not_found())),
        _ => Err(not_found()),
    }
}

/// Indexed get: dynamic probe first, then the structural indexer. Lists
/// index natively by integer.
fn indexed_get(target: &Value, index: &Value) -> Result<Value, EvalError> {
    let not_found = || EvalError::IndexerNotFound {
        target: target_name(target),
    };
    match target {
        Value::Object(obj) => {
            if let Some(dynamic) = obj.dynamic() {
                if let Some(value) = dynamic.try_get_index(index) {
                    return Ok(value);
                }
            }
            obj.members().index(index).ok_or_else(not_found)
        }
        Value::TypeRef(t) => t.members().index(index).ok_or_else(not_found),
        Value::List(items) => match index {
            Value::Int(i) if *i >= 0 => items
                .get(usize::try_from(*i).unwrap_or(usize::MAX))
                .cloned()
                .ok_or_else(not_found),
            _ => Err(not_found()),
        },
        _ => Err(not_found()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_with(src: &str, params: &Bindings) -> Result<Value, EvalError> {
        let ast = crate::parse::parse(src).expect("parse");
        let env = EvalEnv {
            parameters: params,
            functions: None,
            objects: None,
            options: Options::default(),
        };
        Evaluator::new(env).run(&ast, None)
    }

    fn eval(src: &str) -> Result<Value, EvalError> {
        eval_with(src, &Bindings::new())
    }

    #[test]
    fn arithmetic_and_precedence() {
        assert_eq!(eval("2 * 3").unwrap(), Value::Int(6));
        assert_eq!(eval("2+2*2").unwrap(), Value::Int(6));
        assert_eq!(eval("2*2+2").unwrap(), Value::Int(6));
        assert_eq!(eval("6 / 2").unwrap(), Value::Float(3.0));
        assert_eq!(eval("18/2/2*3").unwrap(), Value::Float(13.5));
    }

    #[test]
    fn short_circuit_skips_faulting_right_side() {
        assert_eq!(eval("1 > 2 && 7 % 0 > 1").unwrap(), Value::Bool(false));
        assert_eq!(eval("1 < 2 || 7 % 0 > 1").unwrap(), Value::Bool(true));
        assert!(eval("1 < 2 && 7 % 0 > 1").is_err());
    }

    #[test]
    fn ternary_visits_one_branch() {
        assert_eq!(eval("1+2<3 ? 3+4 : 1").unwrap(), Value::Int(1));
        assert_eq!(eval("1+2<4 ? 3+4 : 7 % 0").unwrap(), Value::Int(7));
    }

    #[test]
    fn identifier_resolves_bound_parameter() {
        let params = Bindings::new().set("a", 4_i64).set("b", 38_i64);
        assert_eq!(eval_with("a + b", &params).unwrap(), Value::Int(42));
    }

    #[test]
    fn unbound_identifier_is_its_own_name() {
        assert_eq!(eval("foo").unwrap(), Value::String("foo".to_owned()));
    }

    #[test]
    fn list_indexing() {
        let params = Bindings::new().set("xs", vec![10_i64, 20, 30]);
        assert_eq!(eval_with("xs[1]", &params).unwrap(), Value::Int(20));
        assert!(matches!(
            eval_with("xs[9]", &params).unwrap_err(),
            EvalError::IndexerNotFound { .. }
        ));
        assert!(eval_with("xs[0-1]", &params).is_err());
    }

    #[test]
    fn member_on_plain_value_fails() {
        let params = Bindings::new().set("n", 1_i64);
        assert!(matches!(
            eval_with("n.Year", &params).unwrap_err(),
            EvalError::MemberNotFound { .. }
        ));
    }

    #[test]
    fn dotted_path_without_resolution_accumulates() {
        // With no object resolver, a dotted identifier path stays a growing
        // string; the top-level result is that path.
        assert_eq!(
            eval("System.Math").unwrap(),
            Value::String("System.Math".to_owned())
        );
    }

    #[test]
    fn function_without_resolver_leaves_result_null() {
        assert_eq!(eval("Missing(1, 2)").unwrap(), Value::Null);
    }
}
