//! Hook discovery and the process-wide hook list cache.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::error::DispatchResult;
use crate::hooks::hook::{sort_by_priority, Hook};
use crate::modules::discovery::discover_modules;
use crate::observability::metrics;

/// Hooks available to the loader, keyed by module path under the hooks root
/// (`auth` for `hooks/auth.rs`, `audit/trail` for `hooks/audit/trail.rs`).
#[derive(Debug, Clone, Default)]
pub struct HookCatalog {
    entries: HashMap<String, Hook>,
}

impl HookCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: impl Into<String>, hook: Hook) -> &mut Self {
        self.entries.insert(module.into(), hook);
        self
    }

    pub fn get(&self, module: &str) -> Option<&Hook> {
        self.entries.get(module)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared, sorted hook list.
pub type HookList = Arc<Vec<Hook>>;

/// Get-or-compute cell for the sorted hook list.
#[derive(Debug, Default)]
pub struct HookCache {
    slot: ArcSwapOption<Vec<Hook>>,
}

impl HookCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<HookList> {
        self.slot.load_full()
    }

    pub fn set(&self, hooks: HookList) {
        self.slot.store(Some(hooks));
    }

    pub fn clear(&self) {
        self.slot.store(None);
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.load().is_some()
    }
}

/// Discovers hook modules under a root and caches the sorted result.
#[derive(Debug)]
pub struct HookLoader {
    root: PathBuf,
    extension: String,
    catalog: HookCatalog,
    cache: Arc<HookCache>,
}

impl HookLoader {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>, catalog: HookCatalog) -> Self {
        Self::with_cache(root, extension, catalog, Arc::new(HookCache::new()))
    }

    pub fn with_cache(
        root: impl Into<PathBuf>,
        extension: impl Into<String>,
        catalog: HookCatalog,
        cache: Arc<HookCache>,
    ) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            catalog,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<HookCache> {
        &self.cache
    }

    /// Sorted hook list, scanning the hooks root only on the first call.
    ///
    /// An empty result is cached like any other; concurrent first calls may
    /// each scan and store the same list.
    pub async fn load(&self) -> DispatchResult<HookList> {
        if let Some(hooks) = self.cache.get() {
            return Ok(hooks);
        }

        let hooks = Arc::new(self.scan().await?);
        metrics::record_hooks_loaded(hooks.len());
        tracing::info!(
            root = %self.root.display(),
            count = hooks.len(),
            "Hooks loaded"
        );

        self.cache.set(Arc::clone(&hooks));
        Ok(hooks)
    }

    /// Drop the cached list so the next `load` rescans.
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    async fn scan(&self) -> DispatchResult<Vec<Hook>> {
        let modules = discover_modules(&self.root, &self.extension).await?;

        let mut hooks = Vec::with_capacity(modules.len());
        for module in modules {
            match self.catalog.get(&module) {
                Some(hook) if hook.is_usable() => hooks.push(hook.clone()),
                Some(_) => {
                    tracing::debug!(module = %module, "Hook defines neither pre nor post, skipped");
                }
                None => {
                    tracing::debug!(module = %module, "No hook registered for module, skipped");
                }
            }
        }

        sort_by_priority(&mut hooks);
        Ok(hooks)
    }
}
