//! Rejects writes that carry no credentials.

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use thunder_dispatch::hooks::{pre_fn, Hook};
use thunder_dispatch::http::Request;

const GUARDED: &[&str] = &["create_user"];

pub fn hook() -> Hook {
    Hook::new("auth").with_priority(100).with_pre(pre_fn(|scope, req: &mut Request| {
        if !GUARDED.iter().any(|h| *h == scope.handler) || req.headers().contains_key(header::AUTHORIZATION) {
            return Ok(None);
        }

        tracing::debug!(router = scope.router, handler = scope.handler, "Missing credentials");
        Ok(Some(
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": "missing credentials" }))).into_response(),
        ))
    }))
}
