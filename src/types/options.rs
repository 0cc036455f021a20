/// Evaluation options for an [`Expression`](super::Expression).
///
/// The default (`Options::default()`) enables nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Skip the compilation cache for this expression, even when one is
    /// attached.
    pub no_cache: bool,
    /// Broadcast mode: treat list-valued parameters as element sequences and
    /// produce one result per element.
    pub iterate_parameters: bool,
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    #[must_use]
    pub fn iterate_parameters(mut self) -> Self {
        self.iterate_parameters = true;
        self
    }
}
