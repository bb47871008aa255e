//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router that hands every request to the dispatcher
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve on a listener until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::DispatchConfig;
use crate::dispatch::Dispatcher;
use crate::http::request::{x_request_id, UuidRequestId, X_REQUEST_ID};
use crate::http::{Request, Response};

/// HTTP front end of the dispatcher.
pub struct HttpServer {
    router: Router,
    config: DispatchConfig,
}

impl HttpServer {
    pub fn new(config: DispatchConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let router = Self::build_router(&config, dispatcher);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DispatchConfig, dispatcher: Arc<Dispatcher>) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id(), UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request| {
                let request_id = req
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %request_id
                )
            }))
            .layer(PropagateRequestIdLayer::new(x_request_id()))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));

        Router::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(middleware)
    }

    /// The fully layered router, for serving through other means (tests).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount = %self.config.routes.mount,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }
}

/// Every path lands here. A dropped connection drops this future, which
/// cancels the dispatch token.
async fn dispatch_handler(State(dispatcher): State<Arc<Dispatcher>>, req: Request) -> Response {
    dispatcher.dispatch(req).await
}
