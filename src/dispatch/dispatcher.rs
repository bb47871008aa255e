//! Request dispatch entry point.
//!
//! # Responsibilities
//! - Resolve the pathname to a routing module
//! - Load the module's router and match the remaining path
//! - Run the executor with the cached hook list
//! - Log and measure the outcome
//!
//! # Design Decisions
//! - Unhandled requests go to the [`Fallback`]; configuration failures become
//!   a generic 500 and never take the process down
//! - Cancellation is a token in the request extensions; an aborted dispatch
//!   is dropped without logging

use std::sync::Arc;
use std::time::Instant;

use axum::http::Method;
use tokio_util::sync::CancellationToken;

use crate::config::DispatchConfig;
use crate::dispatch::fallback::{Fallback, NotFoundFallback};
use crate::error::DispatchError;
use crate::hooks::loader::{HookCatalog, HookLoader};
use crate::http::{response, Request, Response};
use crate::modules::registry::ModuleSource;
use crate::observability::{logging, metrics};
use crate::resolve::resolver::PathResolver;
use crate::routing::router::RouteMatch;

/// Access the dispatch cancellation token from hooks and handlers.
pub trait RequestCancellationExt {
    /// Token cancelled when the dispatch is aborted. Outside a dispatch this
    /// is a fresh token that never fires.
    fn cancellation(&self) -> CancellationToken;

    fn is_cancelled(&self) -> bool {
        self.cancellation().is_cancelled()
    }
}

impl RequestCancellationExt for Request {
    fn cancellation(&self) -> CancellationToken {
        self.extensions()
            .get::<CancellationToken>()
            .cloned()
            .unwrap_or_default()
    }
}

/// Maps requests onto routing modules, routes and the hook pipeline.
pub struct Dispatcher {
    resolver: PathResolver,
    modules: Arc<dyn ModuleSource>,
    hooks: HookLoader,
    fallback: Arc<dyn Fallback>,
}

impl Dispatcher {
    pub fn new(resolver: PathResolver, modules: Arc<dyn ModuleSource>, hooks: HookLoader) -> Self {
        Self {
            resolver,
            modules,
            hooks,
            fallback: Arc::new(NotFoundFallback),
        }
    }

    /// Dispatcher wired from the `routes` and `hooks` config sections.
    pub fn from_config(config: &DispatchConfig, modules: Arc<dyn ModuleSource>, hooks: HookCatalog) -> Self {
        let routes = &config.routes;
        let resolver = PathResolver::new(&routes.api_root, &routes.mount, routes.module_extension.as_str())
            .with_max_depth(routes.max_depth);
        let hooks = HookLoader::new(&config.hooks.root, config.hooks.extension.as_str(), hooks);
        Self::new(resolver, modules, hooks)
    }

    pub fn with_fallback(mut self, fallback: impl Fallback + 'static) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn hooks(&self) -> &HookLoader {
        &self.hooks
    }

    /// Forget cached resolutions and the hook list.
    pub fn invalidate_caches(&self) {
        self.resolver.cache().clear();
        self.hooks.invalidate();
    }

    /// Dispatch `req` to completion.
    ///
    /// Dropping the returned future before it completes cancels the token
    /// handed to hooks and handlers. A completed dispatch leaves it untouched.
    pub async fn dispatch(&self, req: Request) -> Response {
        let token = CancellationToken::new();
        let guard = token.clone().drop_guard();
        let res = self.run(req, token).await;
        guard.disarm();
        res
    }

    /// Dispatch `req` unless `token` fires first, in which case nothing is
    /// logged and `None` is returned.
    pub async fn dispatch_cancellable(&self, req: Request, token: CancellationToken) -> Option<Response> {
        let child = token.child_token();
        tokio::select! {
            biased;
            _ = token.cancelled() => None,
            res = self.run(req, child) => Some(res),
        }
    }

    async fn run(&self, mut req: Request, token: CancellationToken) -> Response {
        let start = Instant::now();
        let method = req.method().clone();
        let url = req.uri().to_string();
        let pathname = req.uri().path().to_string();
        req.extensions_mut().insert(token);

        if !self.resolver.is_api_path(&pathname) {
            return self.fall_back(req, &method, start).await;
        }

        let resolution = match self.resolver.resolve(&pathname).await {
            Ok(resolution) => resolution,
            Err(DispatchError::NotFound(_)) => return self.fall_back(req, &method, start).await,
            Err(e) => return self.fail(&method, &url, e, start),
        };

        let router = match self.modules.load(&resolution.module) {
            Ok(router) => router,
            Err(e) => return self.fail(&method, &url, e, start),
        };

        let remaining = resolution.remaining_path();
        let executor = match router.match_route(&method, &remaining) {
            RouteMatch::Found(executor) => executor,
            RouteMatch::NoTables(res) => return self.finish(&method, &url, res, start),
            RouteMatch::Unmatched => return self.fall_back(req, &method, start).await,
        };

        let hooks = match self.hooks.load().await {
            Ok(hooks) => hooks,
            Err(e) => return self.fail(&method, &url, e, start),
        };

        tracing::debug!(
            module = %resolution.module,
            router = executor.router_name(),
            handler = executor.handler_name(),
            hooks = hooks.len(),
            "Dispatching"
        );

        let res = executor.execute(req, &hooks).await;
        self.finish(&method, &url, res, start)
    }

    async fn fall_back(&self, req: Request, method: &Method, start: Instant) -> Response {
        tracing::debug!(path = %req.uri().path(), "No route, using fallback");
        let res = self.fallback.handle(req).await;
        metrics::record_dispatch(method.as_str(), res.status().as_u16(), start);
        res
    }

    fn fail(&self, method: &Method, url: &str, err: DispatchError, start: Instant) -> Response {
        tracing::error!(method = %method, url, error = %err, "Dispatch failed");
        self.finish(method, url, response::internal_error(), start)
    }

    fn finish(&self, method: &Method, url: &str, res: Response, start: Instant) -> Response {
        let status = res.status().as_u16();
        logging::log_outcome(method.as_str(), url, status);
        metrics::record_dispatch(method.as_str(), status, start);
        res
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("resolver", &self.resolver)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::error::{DispatchResult, HandlerError};
    use crate::routing::handler::{async_handler_fn, handler_fn};
    use crate::routing::router::Router;

    #[derive(Default)]
    struct Modules(HashMap<String, Arc<Router>>);

    impl ModuleSource for Modules {
        fn load(&self, module: &str) -> DispatchResult<Arc<Router>> {
            self.0
                .get(module)
                .cloned()
                .ok_or_else(|| DispatchError::Configuration(module.to_string()))
        }
    }

    fn dispatcher(dir: &tempfile::TempDir, modules: Modules) -> Dispatcher {
        let resolver = PathResolver::new(dir.path().join("api"), "api", "rs");
        let hooks = HookLoader::new(dir.path().join("hooks"), "rs", HookCatalog::new());
        Dispatcher::new(resolver, Arc::new(modules), hooks)
    }

    fn users_tree() -> (tempfile::TempDir, Modules) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("api")).unwrap();
        std::fs::write(dir.path().join("api/users.rs"), "").unwrap();
        std::fs::write(dir.path().join("api/orphan.rs"), "").unwrap();

        let mut router = Router::new("users");
        router
            .get("/:id", "get_user", || {
                handler_fn(|_req: &mut Request| Ok(StatusCode::OK.into_response()))
            })
            .unwrap();

        let mut modules = Modules::default();
        modules.0.insert("users".into(), Arc::new(router));
        (dir, modules)
    }

    fn get(uri: &str) -> Request {
        axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_matches_route() {
        let (dir, modules) = users_tree();
        let res = dispatcher(&dir, modules).dispatch(get("/api/users/42")).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unmatched_goes_to_fallback() {
        struct Counting(Arc<AtomicUsize>);

        #[async_trait]
        impl Fallback for Counting {
            async fn handle(&self, _req: Request) -> Response {
                self.0.fetch_add(1, Ordering::SeqCst);
                StatusCode::IM_A_TEAPOT.into_response()
            }
        }

        let (dir, modules) = users_tree();
        let hits = Arc::new(AtomicUsize::new(0));
        let d = dispatcher(&dir, modules).with_fallback(Counting(hits.clone()));

        for uri in ["/index.html", "/api/missing/1", "/api/users/42/extra"] {
            assert_eq!(d.dispatch(get(uri)).await.status(), StatusCode::IM_A_TEAPOT);
        }
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_tables_is_404_without_fallback() {
        let (dir, modules) = users_tree();
        let req = axum::http::Request::builder()
            .method(Method::DELETE)
            .uri("/api/users/42")
            .body(Body::empty())
            .unwrap();
        let res = dispatcher(&dir, modules).dispatch(req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_configuration_error_is_generic_500() {
        let (dir, modules) = users_tree();
        let res = dispatcher(&dir, modules).dispatch(get("/api/orphan")).await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn test_cancelled_dispatch_returns_none() {
        let (dir, mut modules) = users_tree();
        let mut slow = Router::new("slow");
        slow.get("/", "wait", || {
            async_handler_fn(|req: Request| async move {
                req.cancellation().cancelled().await;
                Ok::<_, HandlerError>(StatusCode::OK.into_response())
            })
        })
        .unwrap();
        modules.0.insert("slow".into(), Arc::new(slow));
        std::fs::write(dir.path().join("api/slow.rs"), "").unwrap();

        let d = dispatcher(&dir, modules);
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        assert!(d.dispatch_cancellable(get("/api/slow"), token).await.is_none());
    }

    fn with_module(dir: &tempfile::TempDir, modules: &mut Modules, name: &str, router: Router) {
        modules.0.insert(name.into(), Arc::new(router));
        std::fs::write(dir.path().join(format!("api/{name}.rs")), "").unwrap();
    }

    #[tokio::test]
    async fn test_completed_dispatch_leaves_token_live() {
        let (dir, mut modules) = users_tree();
        let seen: Arc<std::sync::Mutex<Option<CancellationToken>>> = Arc::default();

        let stash = seen.clone();
        let mut keep = Router::new("keep");
        keep.get("/", "keep", move || {
            let stash = stash.clone();
            handler_fn(move |req: &mut Request| {
                *stash.lock().unwrap() = Some(req.cancellation());
                Ok(StatusCode::OK.into_response())
            })
        })
        .unwrap();
        with_module(&dir, &mut modules, "keep", keep);

        let res = dispatcher(&dir, modules).dispatch(get("/api/keep")).await;
        assert_eq!(res.status(), StatusCode::OK);

        let token = seen.lock().unwrap().clone().unwrap();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn test_dropped_dispatch_cancels_handler() {
        let (dir, mut modules) = users_tree();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (observed_tx, observed_rx) = tokio::sync::oneshot::channel::<()>();
        let started = Arc::new(std::sync::Mutex::new(Some(started_tx)));
        let observed = Arc::new(std::sync::Mutex::new(Some(observed_tx)));

        let mut hang = Router::new("hang");
        hang.get("/", "hang", move || {
            let started = started.clone();
            let observed = observed.clone();
            async_handler_fn(move |req: Request| {
                let started = started.lock().unwrap().take();
                let observed = observed.lock().unwrap().take();
                async move {
                    let token = req.cancellation();
                    tokio::spawn(async move {
                        token.cancelled().await;
                        if let Some(tx) = observed {
                            let _ = tx.send(());
                        }
                    });
                    if let Some(tx) = started {
                        let _ = tx.send(());
                    }
                    std::future::pending::<()>().await;
                    Ok::<_, HandlerError>(StatusCode::OK.into_response())
                }
            })
        })
        .unwrap();
        with_module(&dir, &mut modules, "hang", hang);

        let d = Arc::new(dispatcher(&dir, modules));
        let task = tokio::spawn({
            let d = d.clone();
            async move { d.dispatch(get("/api/hang")).await }
        });

        started_rx.await.unwrap();
        task.abort();

        tokio::time::timeout(std::time::Duration::from_secs(2), observed_rx)
            .await
            .expect("handler never saw cancellation")
            .unwrap();
    }

    #[tokio::test]
    async fn test_request_sees_token() {
        let req = get("/");
        assert!(!req.is_cancelled());
    }
}
