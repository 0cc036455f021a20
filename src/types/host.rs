use std::sync::Arc;

use crate::evaluate::{EvalEnv, Evaluator};

use super::bindings::Bindings;
use super::error::EvalError;
use super::expr::Expr;
use super::value::Value;

/// Host callback resolving function calls.
///
/// Invoked with the dispatch name (namespace-qualified when the call sits at
/// the end of a dotted path), the unevaluated argument list, and the per-call
/// context. Writing into the result slot marks the call handled; returning
/// without writing means "not mine", which is not an error.
pub type FunctionResolver =
    Arc<dyn Fn(&str, &mut FunctionArgs<'_>, Option<&Bindings>) -> Result<(), EvalError> + Send + Sync>;

/// Host callback resolving an identifier (or dotted path) to an object or
/// type value. `None` keeps the path open for namespace extension.
pub type ObjectResolver = Arc<dyn Fn(&str) -> Option<Value> + Send + Sync>;

/// The argument list handed to a [`FunctionResolver`].
///
/// Arguments are not evaluated up front; the resolver decides which to
/// force, in what order, and against which context. Skipped arguments are
/// never visited, so a side-effecting or faulting argument costs nothing
/// unless it is actually used.
pub struct FunctionArgs<'a> {
    parameters: Vec<Argument<'a>>,
    result: Option<Value>,
}

impl<'a> FunctionArgs<'a> {
    pub(crate) fn new(exprs: &'a [Expr], env: EvalEnv<'a>) -> Self {
        FunctionArgs {
            parameters: exprs.iter().map(|expr| Argument { expr, env }).collect(),
            result: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// The unevaluated arguments, in call order.
    #[must_use]
    pub fn parameters(&self) -> &[Argument<'a>] {
        &self.parameters
    }

    #[must_use]
    pub fn parameter(&self, index: usize) -> Option<&Argument<'a>> {
        self.parameters.get(index)
    }

    /// Evaluate every argument in order against the given context.
    ///
    /// # Errors
    ///
    /// Propagates the first evaluation failure.
    pub fn evaluate_all(&self, context: Option<&Bindings>) -> Result<Vec<Value>, EvalError> {
        self.parameters
            .iter()
            .map(|p| p.evaluate(context))
            .collect()
    }

    /// Write the call result, marking the call as handled.
    pub fn set_result(&mut self, value: impl Into<Value>) {
        self.result = Some(value.into());
    }

    #[must_use]
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    pub(crate) fn take_result(&mut self) -> Option<Value> {
        self.result.take()
    }
}

/// A single unevaluated argument, carrying the parent expression's
/// parameters, callbacks, and options.
pub struct Argument<'a> {
    expr: &'a Expr,
    env: EvalEnv<'a>,
}

impl Argument<'_> {
    /// Evaluate this argument against a caller-chosen context.
    ///
    /// # Errors
    ///
    /// Propagates any evaluation failure from the argument subtree.
    pub fn evaluate(&self, context: Option<&Bindings>) -> Result<Value, EvalError> {
        Evaluator::new(self.env).run(self.expr, context)
    }

    /// The underlying expression tree of this argument.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        self.expr
    }
}
