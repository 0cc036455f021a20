//! Source-text compilation and the shared compilation cache.
//!
//! The cache maps source text to weak handles on compiled trees. A tree kept
//! alive by any expression stays cached and identical for everyone compiling
//! the same text; once the last strong reference drops, the entry becomes
//! dead and is swept opportunistically after a later insert. There is no
//! size or LRU policy — reachability is the eviction rule.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, Weak};

use crate::parse;
use crate::types::{EvalError, Expr};

/// Parse source text into a shared tree, without cache involvement.
pub(crate) fn compile_text(text: &str) -> Result<Arc<Expr>, EvalError> {
    parse::parse(text)
        .map(Arc::new)
        .map_err(EvalError::Parse)
}

/// A thread-safe cache of compiled expression trees, keyed by source text.
///
/// Owned by the embedding application and attached to expressions with
/// [`Expression::with_cache`](crate::Expression::with_cache), typically
/// behind an `Arc` shared across threads. Lookups run under a read lock and
/// do not block each other; inserts and sweeps take the write lock.
pub struct CompileCache {
    enabled: AtomicBool,
    entries: RwLock<HashMap<String, Weak<Expr>>>,
}

impl Default for CompileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileCache {
    #[must_use]
    pub fn new() -> Self {
        CompileCache {
            enabled: AtomicBool::new(true),
            entries: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enable or disable caching. Disabling clears all entries immediately
    /// and suppresses inserts until re-enabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
        if !enabled {
            self.entries
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clear();
        }
    }

    /// Number of entries currently held, dead handles included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Compile source text, reusing a live cached tree when possible.
    ///
    /// While any previously returned `Arc` for the same text is still alive,
    /// this returns that identical instance. `bypass` skips both lookup and
    /// insert for this call.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Parse`] with every diagnostic the parser emitted.
    pub fn compile(&self, text: &str, bypass: bool) -> Result<Arc<Expr>, EvalError> {
        let use_cache = self.enabled() && !bypass;

        if use_cache {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(found) = entries.get(text).and_then(Weak::upgrade) {
                return Ok(found);
            }
        }

        let compiled = compile_text(text)?;

        if use_cache {
            let mut entries = self
                .entries
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            entries.insert(text.to_owned(), Arc::downgrade(&compiled));
            // Opportunistic sweep: drop entries whose tree has been collected.
            entries.retain(|_, handle| handle.strong_count() > 0);
        }

        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_shares_one_tree() {
        let cache = CompileCache::new();
        let a = cache.compile("1 + 2", false).unwrap();
        let b = cache.compile("1 + 2", false).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn bypass_skips_lookup_and_insert() {
        let cache = CompileCache::new();
        let a = cache.compile("1 + 2", true).unwrap();
        assert!(cache.is_empty());
        let b = cache.compile("1 + 2", true).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn dead_entries_are_swept_after_insert() {
        let cache = CompileCache::new();
        {
            let _short_lived = cache.compile("1 + 2", false).unwrap();
            assert_eq!(cache.len(), 1);
        }
        // The tree is gone; the next insert sweeps the dead entry.
        let _other = cache.compile("3 * 4", false).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn recompile_after_collection_yields_new_tree() {
        let cache = CompileCache::new();
        let first = cache.compile("1 + 2", false).unwrap();
        let first_ptr = Arc::as_ptr(&first);
        drop(first);
        let second = cache.compile("1 + 2", false).unwrap();
        // The old entry was dead; a fresh tree was compiled. Pointer values
        // may coincidentally match after reallocation, so assert on cache
        // state rather than the address.
        let _ = first_ptr;
        assert_eq!(cache.len(), 1);
        drop(second);
    }

    #[test]
    fn disabling_clears_and_suppresses() {
        let cache = CompileCache::new();
        let kept = cache.compile("1 + 2", false).unwrap();
        assert_eq!(cache.len(), 1);

        cache.set_enabled(false);
        assert!(cache.is_empty());

        let again = cache.compile("1 + 2", false).unwrap();
        assert!(cache.is_empty());
        assert!(!Arc::ptr_eq(&kept, &again));

        cache.set_enabled(true);
        let cached = cache.compile("1 + 2", false).unwrap();
        assert_eq!(cache.len(), 1);
        let hit = cache.compile("1 + 2", false).unwrap();
        assert!(Arc::ptr_eq(&cached, &hit));
    }

    #[test]
    fn parse_failure_reports_every_diagnostic() {
        let cache = CompileCache::new();
        let err = cache.compile("1 +", false).unwrap_err();
        match err {
            EvalError::Parse(diags) => {
                assert!(!diags.is_empty());
                for d in &diags {
                    assert!(d.line() >= 1);
                    assert!(d.column() >= 1);
                }
            }
            other => panic!("expected Parse, got {other:?}"),
        }
        assert!(cache.is_empty());
    }
}
