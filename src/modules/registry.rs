//! Startup-built registry of routing modules.
//!
//! # Responsibilities
//! - Pair every module file under the API root with the router builder
//!   registered for it in code
//! - Build all routers once, before the registry is shared
//! - Serve routers to the dispatcher by module path
//!
//! # Design Decisions
//! - A file with no builder, or whose builder fails, is recorded as invalid
//!   rather than aborting startup; requests resolving to it get a
//!   configuration error
//! - Builders without a file are unreachable and only logged

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{DispatchError, DispatchResult, RouteError};
use crate::modules::discovery::discover_modules;
use crate::routing::router::{RouteInfo, Router};

/// Builds the router exported by one routing module.
pub type RouterBuilder = fn() -> Result<Router, RouteError>;

/// Code-side map of module path → router builder.
#[derive(Debug, Clone, Default)]
pub struct ModuleCatalog {
    entries: BTreeMap<String, RouterBuilder>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, module: impl Into<String>, builder: RouterBuilder) -> &mut Self {
        self.entries.insert(module.into(), builder);
        self
    }

    pub fn get(&self, module: &str) -> Option<RouterBuilder> {
        self.entries.get(module).copied()
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where the dispatcher gets a router for a resolved module path.
pub trait ModuleSource: Send + Sync {
    /// Router for `module`, or `DispatchError::Configuration` when the module
    /// does not provide a usable one.
    fn load(&self, module: &str) -> DispatchResult<Arc<Router>>;
}

/// One line of the module report.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleReport {
    pub module: String,
    pub router: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub routes: Vec<RouteInfo>,
}

/// Routers discovered under the API root.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    routers: HashMap<String, Arc<Router>>,
    invalid: HashMap<String, String>,
}

impl ModuleRegistry {
    /// Walk `api_root` for `*.<extension>` files and build their routers.
    pub async fn discover(catalog: &ModuleCatalog, api_root: &Path, extension: &str) -> DispatchResult<Self> {
        let found = discover_modules(api_root, extension).await?;
        let mut registry = Self::default();

        for module in &found {
            let Some(build) = catalog.get(module) else {
                tracing::warn!(module = %module, "Module file has no registered router");
                registry
                    .invalid
                    .insert(module.clone(), "no router registered for module".to_string());
                continue;
            };

            match build() {
                Ok(router) => {
                    tracing::debug!(module = %module, router = router.name(), routes = router.len(), "Module registered");
                    registry.routers.insert(module.clone(), Arc::new(router));
                }
                Err(e) => {
                    tracing::warn!(module = %module, error = %e, "Module router failed to build");
                    registry.invalid.insert(module.clone(), e.to_string());
                }
            }
        }

        for module in catalog.modules() {
            if !found.iter().any(|m| m == module) {
                tracing::warn!(module, "Registered router has no module file, unreachable");
            }
        }

        tracing::info!(
            root = %api_root.display(),
            modules = registry.routers.len(),
            invalid = registry.invalid.len(),
            "Module registry built"
        );
        Ok(registry)
    }

    pub fn get(&self, module: &str) -> Option<&Arc<Router>> {
        self.routers.get(module)
    }

    /// Reason `module` was rejected at startup, if it was.
    pub fn invalid_reason(&self, module: &str) -> Option<&str> {
        self.invalid.get(module).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }

    /// Every known module with its routes, sorted by module path.
    pub fn report(&self) -> Vec<ModuleReport> {
        let mut report: Vec<_> = self
            .routers
            .iter()
            .map(|(module, router)| ModuleReport {
                module: module.clone(),
                router: Some(router.name().to_string()),
                error: None,
                routes: router.routes(),
            })
            .chain(self.invalid.iter().map(|(module, reason)| ModuleReport {
                module: module.clone(),
                router: None,
                error: Some(reason.clone()),
                routes: Vec::new(),
            }))
            .collect();
        report.sort_by(|a, b| a.module.cmp(&b.module));
        report
    }
}

impl ModuleSource for ModuleRegistry {
    fn load(&self, module: &str) -> DispatchResult<Arc<Router>> {
        if let Some(router) = self.routers.get(module) {
            return Ok(Arc::clone(router));
        }

        let reason = self
            .invalid
            .get(module)
            .map(String::as_str)
            .unwrap_or("module does not export a router");
        Err(DispatchError::Configuration(format!("{module}: {reason}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Request;
    use crate::routing::handler::handler_fn;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn users() -> Result<Router, RouteError> {
        let mut router = Router::new("users");
        router.get("/:id", "get_user", || {
            handler_fn(|_req: &mut Request| Ok(StatusCode::OK.into_response()))
        })?;
        Ok(router)
    }

    fn broken() -> Result<Router, RouteError> {
        let mut router = Router::new("broken");
        router.get("/*rest/tail", "bad", || {
            handler_fn(|_req: &mut Request| Ok(StatusCode::OK.into_response()))
        })?;
        Ok(router)
    }

    #[tokio::test]
    async fn test_discover_pairs_files_with_builders() {
        let dir = tempfile::tempdir().unwrap();
        for file in ["users.rs", "broken.rs", "stray.rs"] {
            std::fs::write(dir.path().join(file), "").unwrap();
        }

        let mut catalog = ModuleCatalog::new();
        catalog
            .register("users", users)
            .register("broken", broken)
            .register("ghost", users);

        let registry = ModuleRegistry::discover(&catalog, dir.path(), "rs").await.unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.load("users").unwrap().name(), "users");

        assert!(matches!(registry.load("broken"), Err(DispatchError::Configuration(_))));
        assert!(matches!(registry.load("stray"), Err(DispatchError::Configuration(_))));
        assert!(registry.invalid_reason("stray").is_some());
        assert!(registry.load("ghost").is_err());
    }

    #[tokio::test]
    async fn test_report_lists_routes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("users.rs"), "").unwrap();
        std::fs::write(dir.path().join("stray.rs"), "").unwrap();

        let mut catalog = ModuleCatalog::new();
        catalog.register("users", users);
        let registry = ModuleRegistry::discover(&catalog, dir.path(), "rs").await.unwrap();

        let report = registry.report();
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].module, "stray");
        assert!(report[0].error.is_some());
        assert_eq!(report[1].routes.len(), 1);
        assert_eq!(report[1].routes[0].path, "/:id");
    }
}
