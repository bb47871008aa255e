//! Error responses produced by the dispatch core.
//!
//! # Design Decisions
//! - Every error body is JSON of the form `{"error": ...}`
//! - Internal failures never echo their cause to the client

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::error::{HandlerError, ValidationError};
use crate::http::Response;

/// 400 with the prettified validation summary.
pub fn validation_error(err: &ValidationError) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": err.prettify() }))).into_response()
}

/// 500 carrying a handler's failure payload verbatim.
pub fn failure(payload: serde_json::Value) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": payload }))).into_response()
}

/// 500 with a generic message.
pub fn internal_error() -> Response {
    failure(json!("Internal Server Error"))
}

/// Plain-text 404 used when nothing handles the request.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// Map a handler or hook failure onto its response.
pub fn from_handler_error(err: HandlerError) -> Response {
    match err {
        HandlerError::Validation(v) => validation_error(&v),
        HandlerError::Failure(payload) => failure(payload),
    }
}
