use std::sync::Arc;

use crate::compile::{compile_text, CompileCache};
use crate::evaluate::{EvalEnv, Evaluator};

use super::bindings::Bindings;
use super::error::EvalError;
use super::expr::Expr;
use super::host::{FunctionArgs, FunctionResolver, ObjectResolver};
use super::options::Options;
use super::value::Value;

/// A formula bound to parameters, options, and host callbacks, evaluated on
/// demand.
///
/// Holds either source text (compiled lazily, optionally through a shared
/// [`CompileCache`]) or a pre-built tree. The compiled tree is immutable and
/// shared; everything mutable is per-instance.
///
/// # Example
///
/// ```
/// use formulet::{Expression, Value};
///
/// let mut expr = Expression::new("2 + 2 * 2");
/// assert_eq!(expr.evaluate(None).unwrap(), Value::Int(6));
///
/// let mut expr = Expression::new("a * b")
///     .with_parameter("a", 6_i64)
///     .with_parameter("b", 7_i64);
/// assert_eq!(expr.evaluate(None).unwrap(), Value::Int(42));
/// ```
pub struct Expression {
    source: Option<String>,
    parsed: Option<Arc<Expr>>,
    error: Option<String>,
    options: Options,
    parameters: Bindings,
    functions: Option<FunctionResolver>,
    objects: Option<ObjectResolver>,
    cache: Option<Arc<CompileCache>>,
}

impl Expression {
    /// Bind source text. Compilation happens on first use.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Expression {
            source: Some(source.to_owned()),
            parsed: None,
            error: None,
            options: Options::default(),
            parameters: Bindings::new(),
            functions: None,
            objects: None,
            cache: None,
        }
    }

    /// Bind an already compiled tree.
    #[must_use]
    pub fn from_ast(ast: Arc<Expr>) -> Self {
        Expression {
            source: None,
            parsed: Some(ast),
            error: None,
            options: Options::default(),
            parameters: Bindings::new(),
            functions: None,
            objects: None,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Compile through a shared cache. Identical text compiled by any
    /// expression attached to the same cache shares one tree while it stays
    /// reachable.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<CompileCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name, value.into());
        self
    }

    /// Install the resolver invoked for every function call.
    #[must_use]
    pub fn with_functions<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&str, &mut FunctionArgs<'_>, Option<&Bindings>) -> Result<(), EvalError>
            + Send
            + Sync
            + 'static,
    {
        self.functions = Some(Arc::new(resolve));
        self
    }

    /// Install the resolver that maps identifiers and dotted paths to host
    /// objects or types.
    #[must_use]
    pub fn with_objects<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        self.objects = Some(Arc::new(resolve));
        self
    }

    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    #[must_use]
    pub fn parameters(&self) -> &Bindings {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Bindings {
        &mut self.parameters
    }

    pub fn set_parameter(&mut self, name: &str, value: impl Into<Value>) {
        self.parameters.insert(name, value.into());
    }

    /// Compile if needed, converting any failure into a stored message
    /// instead of propagating it. Returns `true` when compilation failed.
    pub fn has_errors(&mut self) -> bool {
        match self.ensure_compiled() {
            Ok(_) => self.error.is_some(),
            Err(e) => {
                self.error = Some(e.to_string());
                true
            }
        }
    }

    /// The stored compilation error message, if [`has_errors`](Self::has_errors)
    /// found one.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The compiled tree, compiling first if needed.
    ///
    /// # Errors
    ///
    /// Propagates [`EvalError::Parse`] from compilation.
    pub fn ast(&mut self) -> Result<Arc<Expr>, EvalError> {
        self.ensure_compiled()
    }

    /// Evaluate against the current parameters and an optional per-call
    /// context map.
    ///
    /// With `iterate_parameters` set, every list-valued parameter must share
    /// one element count; the expression runs once per element and the
    /// results are collected into a list. The caller's parameter map is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Propagates compilation and evaluation failures; see
    /// [`EvalError`](crate::EvalError) for the taxonomy.
    pub fn evaluate(&mut self, context: Option<&Bindings>) -> Result<Value, EvalError> {
        let ast = self.ensure_compiled()?;
        if self.options.iterate_parameters {
            return self.evaluate_iterated(&ast);
        }
        Evaluator::new(self.env()).run(&ast, context)
    }

    fn ensure_compiled(&mut self) -> Result<Arc<Expr>, EvalError> {
        if let Some(ast) = &self.parsed {
            return Ok(Arc::clone(ast));
        }
        let text = self.source.as_deref().unwrap_or("");
        let compiled = match &self.cache {
            Some(cache) => cache.compile(text, self.options.no_cache)?,
            None => compile_text(text)?,
        };
        self.parsed = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    fn env(&self) -> EvalEnv<'_> {
        EvalEnv {
            parameters: &self.parameters,
            functions: self.functions.as_ref(),
            objects: self.objects.as_ref(),
            options: self.options,
        }
    }

    /// Broadcast mode: one pass per element of the list-valued parameters.
    fn evaluate_iterated(&self, ast: &Expr) -> Result<Value, EvalError> {
        let mut names: Vec<&str> = self.parameters.iter().map(|(name, _)| name).collect();
        names.sort_unstable();

        let mut size: Option<usize> = None;
        for name in &names {
            if let Some(Value::List(items)) = self.parameters.get(name) {
                match size {
                    None => size = Some(items.len()),
                    Some(expected) if expected != items.len() => {
                        return Err(EvalError::MismatchedIterationLength {
                            name: (*name).to_owned(),
                            expected,
                            actual: items.len(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }
        let Some(count) = size else {
            // No sequence-valued parameters: zero passes.
            return Ok(Value::List(Vec::new()));
        };

        let mut results = Vec::with_capacity(count);
        for i in 0..count {
            let mut pass = self.parameters.clone();
            for name in &names {
                if let Some(Value::List(items)) = self.parameters.get(name) {
                    pass.insert(name, items[i].clone());
                }
            }
            let env = EvalEnv {
                parameters: &pass,
                functions: self.functions.as_ref(),
                objects: self.objects.as_ref(),
                options: self.options,
            };
            results.push(Evaluator::new(env).run(ast, None)?);
        }
        Ok(Value::List(results))
    }
}
