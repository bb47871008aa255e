//! Pathname → routing module resolution.
//!
//! # Responsibilities
//! - Strip the API mount prefix from a request pathname
//! - Walk the API root one segment at a time until a module file is found
//! - Hand back the module path and the unconsumed segments
//!
//! # Design Decisions
//! - Per segment, `<seg>` and `<seg>.<ext>` are probed concurrently; a
//!   directory named `<seg>` wins and the walk descends into it
//! - The walk is bounded by `max_depth`, so at most `2 * max_depth` probes
//! - Results, including misses, are memoized by raw pathname
//! - `.`/`..` segments never touch the filesystem

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{DispatchError, DispatchResult};
use crate::resolve::cache::ResolutionCache;

/// Default bound on directory levels a pathname may consume.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Module path used when the pathname names nothing below the mount.
pub const INDEX_MODULE: &str = "index";

/// A resolved routing module plus the path left for route matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Module path relative to the API root, without extension.
    pub module: String,
    /// Segments not consumed by the walk.
    pub remaining: Vec<String>,
}

impl Resolution {
    /// Remaining segments as a rooted path (`/` when empty).
    pub fn remaining_path(&self) -> String {
        format!("/{}", self.remaining.join("/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    Directory,
    File,
    Missing,
}

/// Resolves request pathnames against the API root on disk.
#[derive(Debug, Clone)]
pub struct PathResolver {
    api_root: PathBuf,
    prefix: String,
    extension: String,
    max_depth: usize,
    cache: ResolutionCache,
}

impl PathResolver {
    /// `mount` is the first URL segment of API requests (`api` for `/api/...`).
    pub fn new(api_root: impl Into<PathBuf>, mount: &str, extension: impl Into<String>) -> Self {
        Self {
            api_root: api_root.into(),
            prefix: format!("/{}/", mount.trim_matches('/')),
            extension: extension.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            cache: ResolutionCache::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cache(mut self, cache: ResolutionCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn api_root(&self) -> &Path {
        &self.api_root
    }

    /// Whether `pathname` lives under the API mount.
    pub fn is_api_path(&self, pathname: &str) -> bool {
        pathname.starts_with(&self.prefix)
    }

    /// Resolve `pathname`, consulting the cache first.
    pub async fn resolve(&self, pathname: &str) -> DispatchResult<Resolution> {
        if let Some(cached) = self.cache.get(pathname) {
            return cached.ok_or_else(|| DispatchError::NotFound(pathname.to_string()));
        }

        let resolved = self.walk(pathname).await;
        match &resolved {
            Some(r) => tracing::debug!(pathname, module = %r.module, remaining = ?r.remaining, "Path resolved"),
            None => tracing::debug!(pathname, "Path did not resolve"),
        }

        self.cache.insert(pathname, resolved.clone());
        resolved.ok_or_else(|| DispatchError::NotFound(pathname.to_string()))
    }

    async fn walk(&self, pathname: &str) -> Option<Resolution> {
        let rest = pathname.strip_prefix(&self.prefix)?;
        let mut segments: VecDeque<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

        let mut consumed: Vec<&str> = Vec::new();
        let mut dir = self.api_root.clone();

        while let Some(segment) = segments.pop_front() {
            if consumed.len() >= self.max_depth || !is_safe_segment(segment) {
                return None;
            }

            match self.probe(&dir, segment).await {
                Probe::Directory => {
                    consumed.push(segment);
                    dir.push(segment);
                }
                Probe::File => {
                    consumed.push(segment);
                    break;
                }
                Probe::Missing => return None,
            }
        }

        let module = if consumed.is_empty() {
            INDEX_MODULE.to_string()
        } else {
            consumed.join("/")
        };

        Some(Resolution {
            module,
            remaining: segments.into_iter().map(str::to_string).collect(),
        })
    }

    async fn probe(&self, dir: &Path, segment: &str) -> Probe {
        let plain = dir.join(segment);
        let with_ext = dir.join(format!("{}.{}", segment, self.extension));

        let (plain, with_ext) = tokio::join!(tokio::fs::metadata(&plain), tokio::fs::metadata(&with_ext));

        match plain {
            Ok(meta) if meta.is_dir() => return Probe::Directory,
            Ok(meta) if meta.is_file() => return Probe::File,
            _ => {}
        }
        match with_ext {
            Ok(meta) if meta.is_file() => Probe::File,
            _ => Probe::Missing,
        }
    }
}

fn is_safe_segment(segment: &str) -> bool {
    segment != "." && segment != ".." && !segment.contains(['\\', '\0'])
}

/// Shared resolver handle.
pub type SharedResolver = Arc<PathResolver>;

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("v1/admin")).unwrap();
        std::fs::write(root.join("index.rs"), "").unwrap();
        std::fs::write(root.join("users.rs"), "").unwrap();
        std::fs::write(root.join("v1/orders.rs"), "").unwrap();
        std::fs::write(root.join("v1/admin/audit.rs"), "").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_resolves_file_with_remaining() {
        let dir = tree();
        let resolver = PathResolver::new(dir.path(), "api", "rs");

        let r = resolver.resolve("/api/users/42/posts").await.unwrap();
        assert_eq!(r.module, "users");
        assert_eq!(r.remaining, vec!["42", "posts"]);
        assert_eq!(r.remaining_path(), "/42/posts");
    }

    #[tokio::test]
    async fn test_resolves_through_directories() {
        let dir = tree();
        let resolver = PathResolver::new(dir.path(), "api", "rs");

        let r = resolver.resolve("/api/v1/admin/audit").await.unwrap();
        assert_eq!(r.module, "v1/admin/audit");
        assert!(r.remaining.is_empty());
        assert_eq!(r.remaining_path(), "/");
    }

    #[tokio::test]
    async fn test_empty_path_falls_back_to_index() {
        let dir = tree();
        let resolver = PathResolver::new(dir.path(), "api", "rs");

        let r = resolver.resolve("/api/").await.unwrap();
        assert_eq!(r.module, INDEX_MODULE);
    }

    #[tokio::test]
    async fn test_missing_segment_is_not_found() {
        let dir = tree();
        let resolver = PathResolver::new(dir.path(), "api", "rs");

        let err = resolver.resolve("/api/nope/1").await.unwrap_err();
        assert!(matches!(err, DispatchError::NotFound(_)));
        assert_eq!(resolver.cache().get("/api/nope/1"), Some(None));
    }

    #[tokio::test]
    async fn test_outside_mount_is_not_found() {
        let dir = tree();
        let resolver = PathResolver::new(dir.path(), "api", "rs");

        assert!(!resolver.is_api_path("/assets/app.js"));
        assert!(resolver.resolve("/assets/app.js").await.is_err());
    }

    #[tokio::test]
    async fn test_parent_segments_rejected() {
        let dir = tree();
        let resolver = PathResolver::new(dir.path().join("v1"), "api", "rs");
        assert!(resolver.resolve("/api/../users").await.is_err());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_filesystem() {
        let dir = tree();
        let resolver = PathResolver::new(dir.path(), "api", "rs");

        let cold = resolver.resolve("/api/users/7").await.unwrap();
        std::fs::remove_file(dir.path().join("users.rs")).unwrap();
        let warm = resolver.resolve("/api/users/7").await.unwrap();
        assert_eq!(cold, warm);

        resolver.cache().clear();
        assert!(resolver.resolve("/api/users/7").await.is_err());
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let dir = tempfile::tempdir().unwrap();
        let deep = dir.path().join("a/b/c/d/e/f");
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(dir.path().join("a/b/c/d/leaf.rs"), "").unwrap();
        std::fs::write(deep.join("leaf.rs"), "").unwrap();

        let resolver = PathResolver::new(dir.path(), "api", "rs");

        // Five levels: four directories and a file.
        let r = resolver.resolve("/api/a/b/c/d/leaf").await.unwrap();
        assert_eq!(r.module, "a/b/c/d/leaf");

        // A sixth level never resolves, even though it exists.
        assert!(resolver.resolve("/api/a/b/c/d/e/f").await.is_err());
        assert!(resolver.resolve("/api/a/b/c/d/e/f/leaf").await.is_err());
    }
}
