//! Process-wide cache of analyzed sources
//!
//! Keys carry the content hash of the text, so an edited file simply misses
//! and is analyzed again. Entries are immutable once stored.

use cn_lexer::SourceUnit;
use cn_resolve::{ScopeTable, ScopeTableBuilder};
use cn_span::SourceKey;
use rustc_hash::FxHashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

/// A tokenized source together with its scope table
#[derive(Debug)]
pub struct AnalyzedSource {
    /// Tokenized text
    pub unit: SourceUnit,
    /// Frames and declarations of `unit`
    pub scopes: ScopeTable,
}

impl AnalyzedSource {
    /// Builds the scope table of `unit`
    pub fn analyze(unit: SourceUnit) -> Self {
        let scopes = ScopeTableBuilder::build(&unit);
        Self { unit, scopes }
    }
}

/// Shared map from source keys to analyzed sources
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: RwLock<FxHashMap<SourceKey, Arc<AnalyzedSource>>>,
}

impl SourceCache {
    /// Creates an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process
    pub fn global() -> &'static SourceCache {
        static CACHE: OnceLock<SourceCache> = OnceLock::new();
        CACHE.get_or_init(SourceCache::new)
    }

    /// Stored analysis for `key`, if any
    pub fn get(&self, key: &SourceKey) -> Option<Arc<AnalyzedSource>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Stored analysis for `key`, building it with `build` on a miss
    ///
    /// `build` runs outside the lock. When two callers race on the same key
    /// both may build, but the first insert wins and both get that value.
    pub fn get_or_build(
        &self,
        key: SourceKey,
        build: impl FnOnce() -> AnalyzedSource,
    ) -> Arc<AnalyzedSource> {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(path = %key.path.display(), "source cache hit");
            return hit;
        }

        tracing::debug!(path = %key.path.display(), "source cache miss");
        let built = Arc::new(build());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_insert(built))
    }

    /// Number of stored sources
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    const SOURCE: &str = "<?php\nuse Foo\\Bar;\n$f = fn (Bar $b) => $b;\n";

    fn analyze(text: &str) -> AnalyzedSource {
        AnalyzedSource::analyze(SourceUnit::new("/src/a.php", Arc::from(text)))
    }

    #[test]
    fn test_hit_returns_stored_value() {
        let cache = SourceCache::new();
        let key = SourceKey::for_text("/src/a.php", SOURCE);

        let first = cache.get_or_build(key.clone(), || analyze(SOURCE));
        let second = cache.get_or_build(key, || panic!("must not rebuild on a hit"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_edited_text_is_a_new_key() {
        let cache = SourceCache::new();
        let edited = SOURCE.replace("Bar $b", "Bar $c");

        cache.get_or_build(SourceKey::for_text("/src/a.php", SOURCE), || analyze(SOURCE));
        cache.get_or_build(SourceKey::for_text("/src/a.php", &edited), || analyze(&edited));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_racing_builders_converge() {
        const THREADS: usize = 8;

        let cache = SourceCache::new();
        let builds = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);
        let key = SourceKey::for_text("/src/a.php", SOURCE);

        let results: Vec<Arc<AnalyzedSource>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache.get_or_build(key.clone(), || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            analyze(SOURCE)
                        })
                    })
                })
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });

        assert!(builds.load(Ordering::SeqCst) >= 1);
        assert_eq!(cache.len(), 1);
        let stored = cache.get(&key).unwrap();
        assert!(results.iter().all(|result| Arc::ptr_eq(result, &stored)));
    }
}
