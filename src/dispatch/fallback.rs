//! Seam for requests the dispatch core does not handle.

use async_trait::async_trait;

use crate::http::{response, Request, Response};

/// Receives requests that resolve to no module or match no route.
///
/// A static-asset server with single-page-app fallback plugs in here.
#[async_trait]
pub trait Fallback: Send + Sync {
    async fn handle(&self, req: Request) -> Response;
}

/// Answers every unhandled request with a plain 404.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFoundFallback;

#[async_trait]
impl Fallback for NotFoundFallback {
    async fn handle(&self, _req: Request) -> Response {
        response::not_found()
    }
}
