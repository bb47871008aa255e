//! Route registration and lookup.
//!
//! # Responsibilities
//! - Own one pattern table per method for a routing module
//! - Compile patterns at registration time
//! - Match a method and remaining path to an executor
//!
//! # Design Decisions
//! - Registration completes before a router is shared; matching takes `&self`
//! - Exact-method routes are tried before wildcard routes
//! - Explicit outcome for "no tables at all" versus "nothing matched"

use std::sync::Arc;

use axum::http::Method;
use serde::Serialize;

use crate::dispatch::executor::Executor;
use crate::error::RouteError;
use crate::http::{response, Response};
use crate::routing::handler::{HandlerFactory, IoShape, Prepared};
use crate::routing::params::RouteParams;
use crate::routing::pattern::CompiledPattern;
use crate::routing::table::{PatternTable, RouteMethod, RoutePattern};

/// Result of [`Router::match_route`].
pub enum RouteMatch {
    /// A pattern matched; run the executor to produce the response.
    Found(Executor),
    /// Neither the method's table nor the wildcard table exists.
    NoTables(Response),
    /// Tables exist but no pattern accepted the path.
    Unmatched,
}

impl std::fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteMatch::Found(exec) => f.debug_tuple("Found").field(exec).finish(),
            RouteMatch::NoTables(res) => f.debug_tuple("NoTables").field(&res.status()).finish(),
            RouteMatch::Unmatched => f.write_str("Unmatched"),
        }
    }
}

/// Serializable view of one registered route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub method: String,
    pub path: String,
    pub handler: String,
    pub params: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<IoShape>,
}

/// Named owner of the routes declared by one routing module.
#[derive(Debug)]
pub struct Router {
    name: Arc<str>,
    table: PatternTable,
}

impl Router {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            table: PatternTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `factory` for `method` on `path`.
    ///
    /// Registering an identical pattern twice keeps both; the later one is
    /// shadowed.
    pub fn register(
        &mut self,
        method: impl Into<RouteMethod>,
        path: &str,
        factory: HandlerFactory,
    ) -> Result<&mut Self, RouteError> {
        let pattern = CompiledPattern::compile(path)?;
        let method = method.into();
        tracing::trace!(router = %self.name, method = %method, path, handler = factory.name(), "Route registered");
        self.table.push(method, RoutePattern { pattern, factory });
        Ok(self)
    }

    pub fn get<F, P>(&mut self, path: &str, name: &str, prepare: F) -> Result<&mut Self, RouteError>
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Into<Prepared>,
    {
        self.register(Method::GET, path, HandlerFactory::new(name, prepare))
    }

    pub fn post<F, P>(&mut self, path: &str, name: &str, prepare: F) -> Result<&mut Self, RouteError>
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Into<Prepared>,
    {
        self.register(Method::POST, path, HandlerFactory::new(name, prepare))
    }

    pub fn put<F, P>(&mut self, path: &str, name: &str, prepare: F) -> Result<&mut Self, RouteError>
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Into<Prepared>,
    {
        self.register(Method::PUT, path, HandlerFactory::new(name, prepare))
    }

    pub fn patch<F, P>(&mut self, path: &str, name: &str, prepare: F) -> Result<&mut Self, RouteError>
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Into<Prepared>,
    {
        self.register(Method::PATCH, path, HandlerFactory::new(name, prepare))
    }

    pub fn delete<F, P>(&mut self, path: &str, name: &str, prepare: F) -> Result<&mut Self, RouteError>
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Into<Prepared>,
    {
        self.register(Method::DELETE, path, HandlerFactory::new(name, prepare))
    }

    /// Register on the wildcard table, consulted for every method.
    pub fn all<F, P>(&mut self, path: &str, name: &str, prepare: F) -> Result<&mut Self, RouteError>
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Into<Prepared>,
    {
        self.register(RouteMethod::All, path, HandlerFactory::new(name, prepare))
    }

    /// Find the route for `method` and `path` (the path left after module
    /// resolution, e.g. `/42`).
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch {
        if self.table.exact(method).is_none() && self.table.wildcard().is_none() {
            return RouteMatch::NoTables(response::not_found());
        }

        let Some(route) = self.table.find(method, path) else {
            return RouteMatch::Unmatched;
        };

        let params = route
            .pattern
            .captures(path)
            .map(RouteParams::new)
            .unwrap_or_default();

        RouteMatch::Found(Executor::new(
            Arc::clone(&self.name),
            route.factory.name_arc(),
            route.factory.prepare(),
            params,
        ))
    }

    /// Registered routes, exact tables first. Runs each factory once to read
    /// its shape.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.table
            .iter()
            .map(|(method, route)| RouteInfo {
                method: method.to_string(),
                path: route.pattern.as_str().to_string(),
                handler: route.factory.name().to_string(),
                params: route.pattern.param_names().map(str::to_string).collect(),
                shape: route.factory.prepare().shape,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use crate::http::Request;
    use crate::routing::handler::handler_fn;
    use crate::routing::params::RequestParamsExt;
    use axum::body::Body;

    fn ok(name: &'static str) -> impl Fn() -> Prepared + Send + Sync + 'static {
        move || Prepared::new(handler_fn(move |_req: &mut Request| Ok(name.into_response())))
    }

    #[test]
    fn test_match_extracts_params() {
        let mut router = Router::new("users");
        router.get("/users/:id", "get_user", ok("user")).unwrap();

        match router.match_route(&Method::GET, "/users/42") {
            RouteMatch::Found(exec) => {
                assert_eq!(exec.handler_name(), "get_user");
                assert_eq!(exec.router_name(), "users");
                assert_eq!(exec.params().get("id"), Some("42"));
            }
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_no_tables_is_direct_not_found() {
        let mut router = Router::new("users");
        router.get("/", "list", ok("list")).unwrap();

        match router.match_route(&Method::DELETE, "/") {
            RouteMatch::NoTables(res) => assert_eq!(res.status(), StatusCode::NOT_FOUND),
            other => panic!("expected NoTables, got {:?}", other),
        }
    }

    #[test]
    fn test_unmatched_when_tables_exist() {
        let mut router = Router::new("users");
        router.get("/", "list", ok("list")).unwrap();
        assert!(matches!(router.match_route(&Method::GET, "/nope"), RouteMatch::Unmatched));
    }

    #[test]
    fn test_wildcard_serves_other_methods() {
        let mut router = Router::new("misc");
        router.all("/ping", "ping", ok("pong")).unwrap();
        assert!(matches!(router.match_route(&Method::OPTIONS, "/ping"), RouteMatch::Found(_)));
    }

    #[test]
    fn test_duplicate_registration_is_shadowed() {
        let mut router = Router::new("dupes");
        router
            .get("/x", "first", ok("first"))
            .unwrap()
            .get("/x", "second", ok("second"))
            .unwrap();
        assert_eq!(router.len(), 2);

        match router.match_route(&Method::GET, "/x") {
            RouteMatch::Found(exec) => assert_eq!(exec.handler_name(), "first"),
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut router = Router::new("bad");
        assert!(router.get("/a/:", "broken", ok("x")).is_err());
        assert!(router.is_empty());
    }

    #[test]
    fn test_routes_listing() {
        let mut router = Router::new("users");
        router.get("/users/:id", "get_user", ok("user")).unwrap();
        router.all("/", "root", ok("root")).unwrap();

        let routes = router.routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].method, "GET");
        assert_eq!(routes[0].params, vec!["id".to_string()]);
        assert_eq!(routes[1].method, "ALL");
    }

    #[tokio::test]
    async fn test_params_reach_request() {
        let mut router = Router::new("users");
        router
            .get("/users/:id", "echo_id", || {
                handler_fn(|req: &mut Request| {
                    Ok(req.param("id").unwrap_or_default().into_response())
                })
            })
            .unwrap();

        let RouteMatch::Found(exec) = router.match_route(&Method::GET, "/users/abc") else {
            panic!("expected a match");
        };
        let res = exec.execute(Request::new(Body::empty()), &[]).await;
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"abc");
    }
}
