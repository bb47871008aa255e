//! `/api/v1/status`

use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use thunder_dispatch::error::RouteError;
use thunder_dispatch::http::Request;
use thunder_dispatch::routing::{handler_fn, HandlerResult, RequestParamsExt, Router};

pub fn router() -> Result<Router, RouteError> {
    let mut router = Router::new("status");
    router
        .all("/", "status", || handler_fn(status))?
        .get("/echo/*rest", "echo", || handler_fn(echo))?;
    Ok(router)
}

fn status(req: &mut Request) -> HandlerResult {
    Ok(Json(json!({ "status": "ok", "method": req.method().as_str() })).into_response())
}

fn echo(req: &mut Request) -> HandlerResult {
    Ok(Json(json!({ "rest": req.param("rest") })).into_response())
}
