//! `/api/users`

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use thunder_dispatch::error::{RouteError, ValidationError};
use thunder_dispatch::http::{extract, Request};
use thunder_dispatch::routing::{async_handler_fn, handler_fn, HandlerResult, IoShape, Prepared, Router};

#[derive(Debug, Clone, Serialize)]
struct User {
    id: u32,
    name: &'static str,
}

const USERS: &[User] = &[User { id: 1, name: "ada" }, User { id: 2, name: "grace" }];

#[derive(Debug, Deserialize)]
struct UserPath {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct NewUser {
    name: String,
}

pub fn router() -> Result<Router, RouteError> {
    let mut router = Router::new("users");
    router
        .get("/", "list_users", || handler_fn(list))?
        .get("/:id", "get_user", || {
            Prepared::new(handler_fn(get)).with_shape(IoShape {
                params: Some(json!({ "id": "u32" })),
                returns: Some(json!({ "id": "u32", "name": "string" })),
                ..Default::default()
            })
        })?
        .post("/", "create_user", || {
            Prepared::new(async_handler_fn(create)).with_shape(IoShape {
                body: Some(json!({ "name": "string" })),
                ..Default::default()
            })
        })?;
    Ok(router)
}

fn list(_req: &mut Request) -> HandlerResult {
    Ok(Json(USERS).into_response())
}

fn get(req: &mut Request) -> HandlerResult {
    let path: UserPath = extract::params(req)?;
    match USERS.iter().find(|u| u.id == path.id) {
        Some(user) => Ok(Json(user).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Json(json!({ "error": "user not found" }))).into_response()),
    }
}

async fn create(mut req: Request) -> HandlerResult {
    let user: NewUser = extract::json_body(&mut req).await?;
    if user.name.trim().is_empty() {
        return Err(ValidationError::new()
            .with_issue(["body", "name"], "must not be empty")
            .into());
    }

    let created = json!({ "id": USERS.len() + 1, "name": user.name });
    Ok((StatusCode::CREATED, Json(created)).into_response())
}
