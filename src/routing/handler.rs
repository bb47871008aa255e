//! Handler contract.
//!
//! A route registers a *factory*; the factory runs once per match and yields a
//! [`Prepared`] handler, optionally described by an [`IoShape`].

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::HandlerError;
use crate::http::{Request, Response};

/// Outcome of a handler call.
pub type HandlerResult = Result<Response, HandlerError>;

/// Request handler.
///
/// Receives the request by mutable reference so post hooks still see it after
/// the handler has taken the body.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: &mut Request) -> HandlerResult;
}

/// Adapter for synchronous closures, see [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut Request) -> HandlerResult + Send + Sync,
{
    async fn call(&self, req: &mut Request) -> HandlerResult {
        (self.f)(req)
    }
}

/// Wrap a synchronous closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&mut Request) -> HandlerResult + Send + Sync,
{
    HandlerFn { f }
}

/// Adapter for async functions that only need the request head.
pub struct AsyncHandlerFn<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

#[async_trait]
impl<F, Fut> Handler for AsyncHandlerFn<F, Fut>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn call(&self, req: &mut Request) -> HandlerResult {
        // The handler owns the request; post hooks see an empty-bodied copy.
        let owned = std::mem::replace(req, clone_head(req));
        (self.f)(owned).await
    }
}

/// Wrap an async function taking an owned request as a [`Handler`].
pub fn async_handler_fn<F, Fut>(f: F) -> AsyncHandlerFn<F, Fut>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    AsyncHandlerFn {
        f,
        _fut: PhantomData,
    }
}

fn clone_head(req: &Request) -> Request {
    let mut head = Request::new(axum::body::Body::empty());
    *head.method_mut() = req.method().clone();
    *head.uri_mut() = req.uri().clone();
    *head.version_mut() = req.version();
    *head.headers_mut() = req.headers().clone();
    *head.extensions_mut() = req.extensions().clone();
    head
}

/// Optional description of a handler's inputs and output.
///
/// Opaque to the dispatch core; consumed by validators and route listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IoShape {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub returns: Option<serde_json::Value>,
}

/// What a factory hands back: the handler plus its optional shape.
#[derive(Clone)]
pub struct Prepared {
    pub shape: Option<IoShape>,
    pub handler: Arc<dyn Handler>,
}

impl Prepared {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            shape: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_shape(mut self, shape: IoShape) -> Self {
        self.shape = Some(shape);
        self
    }
}

impl<H: Handler + 'static> From<H> for Prepared {
    fn from(handler: H) -> Self {
        Self::new(handler)
    }
}

/// Named, zero-argument producer of a [`Prepared`] handler.
#[derive(Clone)]
pub struct HandlerFactory {
    name: Arc<str>,
    prepare: Arc<dyn Fn() -> Prepared + Send + Sync>,
}

impl HandlerFactory {
    pub fn new<F, P>(name: impl Into<Arc<str>>, prepare: F) -> Self
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Into<Prepared>,
    {
        Self {
            name: name.into(),
            prepare: Arc::new(move || prepare().into()),
        }
    }

    /// Name reported to hooks as the handler name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub fn prepare(&self) -> Prepared {
        (self.prepare)()
    }
}

impl std::fmt::Debug for HandlerFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerFactory")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
