//! Filesystem watcher that invalidates dispatch caches.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::hooks::loader::HookCache;
use crate::resolve::cache::ResolutionCache;

/// Watches the API and hooks roots and clears the resolution cache and the
/// hook list whenever a file appears, disappears or is renamed.
///
/// Routers themselves are built once at startup; a new module file is only
/// served after a restart.
pub struct ModuleWatcher {
    roots: Vec<PathBuf>,
    resolutions: ResolutionCache,
    hooks: Arc<HookCache>,
}

impl ModuleWatcher {
    pub fn new(resolutions: ResolutionCache, hooks: Arc<HookCache>) -> Self {
        Self {
            roots: Vec::new(),
            resolutions,
            hooks,
        }
    }

    pub fn watch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let resolutions = self.resolutions.clone();
        let hooks = Arc::clone(&self.hooks);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if changes_layout(&event.kind) => {
                    tracing::info!(paths = ?event.paths, "Module layout changed, clearing caches");
                    resolutions.clear();
                    hooks.clear();
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Module watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for root in &self.roots {
            if root.exists() {
                watcher.watch(root, RecursiveMode::Recursive)?;
                tracing::info!(path = %root.display(), "Module watcher started");
            } else {
                tracing::debug!(path = %root.display(), "Watch root missing, skipped");
            }
        }

        Ok(watcher)
    }
}

fn changes_layout(kind: &EventKind) -> bool {
    use notify::event::ModifyKind;

    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Name(_)) => true,
        _ => false,
    }
}
