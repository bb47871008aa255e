//! Memoized pathname resolutions.

use std::sync::Arc;

use dashmap::DashMap;

use crate::observability::metrics;
use crate::resolve::resolver::Resolution;

/// Concurrent map of raw pathname → resolution (or `None` for a known miss).
///
/// Keys are not normalized: `/api/users` and `/api/users/` are cached
/// separately. Racing first-time writers store the same value.
///
/// Misses are memoized too, so every distinct unknown `/<mount>/...` path
/// adds an entry. Nothing is evicted; [`ResolutionCache::clear`] (via
/// `Dispatcher::invalidate_caches` or the module watcher) is the only way
/// to reclaim them.
#[derive(Debug, Clone, Default)]
pub struct ResolutionCache {
    inner: Arc<DashMap<String, Option<Resolution>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Some(entry)` on a hit, where `entry` is `None` for a cached failure.
    pub fn get(&self, pathname: &str) -> Option<Option<Resolution>> {
        let hit = self.inner.get(pathname).map(|r| r.value().clone());
        metrics::record_resolution_cache(hit.is_some());
        hit
    }

    pub fn insert(&self, pathname: impl Into<String>, resolution: Option<Resolution>) {
        self.inner.insert(pathname.into(), resolution);
    }

    pub fn clear(&self) {
        self.inner.clear();
        tracing::debug!("Resolution cache cleared");
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_operations() {
        let cache = ResolutionCache::new();
        assert!(cache.get("/api/users").is_none());

        let resolution = Resolution {
            module: "users".into(),
            remaining: vec!["42".into()],
        };
        cache.insert("/api/users/42", Some(resolution.clone()));
        cache.insert("/api/missing", None);

        assert_eq!(cache.get("/api/users/42"), Some(Some(resolution)));
        assert_eq!(cache.get("/api/missing"), Some(None));
        assert!(cache.get("/api/users/42/").is_none());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_misses_accumulate_until_cleared() {
        let cache = ResolutionCache::new();
        for i in 0..100 {
            cache.insert(format!("/api/unknown-{i}"), None);
        }
        assert_eq!(cache.len(), 100);
        assert_eq!(cache.get("/api/unknown-7"), Some(None));

        cache.clear();
        assert!(cache.is_empty());
    }
}
