use thiserror::Error;

use crate::parse::SyntaxError;

/// Errors surfaced by compilation and evaluation.
///
/// All variants propagate to the immediate caller; nothing is retried
/// internally. A resolver answering "not found" is not an error — it drives
/// the namespace-extension and property-then-field fallback chains.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Aggregated syntax diagnostics from the parser. Fatal to compilation.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n"))]
    Parse(Vec<SyntaxError>),

    #[error("no literal form for a {0} value")]
    UnsupportedLiteralType(&'static str),

    /// An operator application faulted (type mismatch, overflow, zero
    /// divisor, unordered operands).
    #[error("operator '{op}' failed: {message}")]
    Operator { op: String, message: String },

    #[error("member '{name}' not found on {target}")]
    MemberNotFound { name: String, target: String },

    #[error("no indexer on {target}")]
    IndexerNotFound { target: String },

    /// A dotted path ended without resolving and without a terminal
    /// identifier or function segment.
    #[error("unresolved namespace path '{path}'")]
    UnresolvedNamespace { path: String },

    /// Broadcast mode requires every list-valued parameter to share one
    /// element count.
    #[error("iterated parameter '{name}' has {actual} element(s), expected {expected}")]
    MismatchedIterationLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A fault raised by a host resolver or registered method body.
    #[error("{0}")]
    Host(String),
}

impl EvalError {
    /// Convenience for host callbacks that need to fail evaluation.
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        EvalError::Host(message.into())
    }
}
