//! `/api/`

use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use thunder_dispatch::error::RouteError;
use thunder_dispatch::http::Request;
use thunder_dispatch::routing::{handler_fn, HandlerResult, Router};

pub fn router() -> Result<Router, RouteError> {
    let mut router = Router::new("index");
    router.get("/", "service_info", || handler_fn(service_info))?;
    Ok(router)
}

fn service_info(_req: &mut Request) -> HandlerResult {
    Ok(Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response())
}
