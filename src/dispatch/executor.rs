//! Per-request hook pipeline.
//!
//! # Responsibilities
//! - Attach route parameters to the request
//! - Run PRE hooks, the handler, then POST hooks
//! - Turn every failure into a response
//!
//! # Design Decisions
//! - Strictly sequential; hooks never run in parallel
//! - PRE and POST walk the hook list in the same order
//! - The executor is the only error boundary of the pipeline: handler and hook
//!   errors, and panics, end here

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::hooks::hook::{Hook, HookScope};
use crate::http::{response, Request, Response};
use crate::routing::handler::{HandlerResult, IoShape, Prepared};
use crate::routing::params::RouteParams;

/// A matched route bound to its prepared handler and extracted parameters.
pub struct Executor {
    router: Arc<str>,
    handler_name: Arc<str>,
    prepared: Prepared,
    params: RouteParams,
}

impl Executor {
    pub fn new(router: Arc<str>, handler_name: Arc<str>, prepared: Prepared, params: RouteParams) -> Self {
        Self {
            router,
            handler_name,
            prepared,
            params,
        }
    }

    pub fn router_name(&self) -> &str {
        &self.router
    }

    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    pub fn shape(&self) -> Option<&IoShape> {
        self.prepared.shape.as_ref()
    }

    /// Run the pipeline for `req` with `hooks` in their sorted order.
    pub async fn execute(self, mut req: Request, hooks: &[Hook]) -> Response {
        req.extensions_mut().insert(self.params.clone());

        match AssertUnwindSafe(self.run(&mut req, hooks)).catch_unwind().await {
            Ok(Ok(res)) => res,
            Ok(Err(err)) => {
                tracing::debug!(
                    router = %self.router,
                    handler = %self.handler_name,
                    validation = err.is_validation(),
                    error = %err,
                    "Handler pipeline failed"
                );
                response::from_handler_error(err)
            }
            Err(_) => {
                tracing::error!(
                    router = %self.router,
                    handler = %self.handler_name,
                    "Handler pipeline panicked"
                );
                response::internal_error()
            }
        }
    }

    async fn run(&self, req: &mut Request, hooks: &[Hook]) -> HandlerResult {
        let scope = HookScope {
            router: &self.router,
            handler: &self.handler_name,
        };

        for hook in hooks {
            if let Some(pre) = hook.pre() {
                if let Some(res) = pre.pre(scope, req).await? {
                    tracing::debug!(hook = hook.name(), handler = scope.handler, "Pre hook short-circuited");
                    return Ok(res);
                }
            }
        }

        let mut res = self.prepared.handler.call(req).await?;

        for hook in hooks {
            if let Some(post) = hook.post() {
                if let Some(replacement) = post.post(scope, req, &mut res).await? {
                    tracing::debug!(hook = hook.name(), handler = scope.handler, "Post hook replaced response");
                    return Ok(replacement);
                }
            }
        }

        Ok(res)
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("router", &self.router)
            .field("handler", &self.handler_name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
