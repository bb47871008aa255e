//! Typed access to route parameters, query string and JSON body.
//!
//! Every failure is a [`ValidationError`] located at `params`, `query` or
//! `body`, so a handler can `?` it straight into a 400.

use serde::de::DeserializeOwned;

use crate::error::ValidationError;
use crate::http::Request;
use crate::routing::params::RequestParamsExt;

/// Largest JSON body [`json_body`] will buffer (2 MiB).
pub const MAX_JSON_BODY: usize = 2 * 1024 * 1024;

/// Route parameters deserialized into `T`.
///
/// Values are strings on the wire; numeric and boolean fields parse the way
/// form fields do.
pub fn params<T: DeserializeOwned>(req: &Request) -> Result<T, ValidationError> {
    let params = req.params();
    let encoded = serde_urlencoded::to_string(params.as_map())
        .map_err(|e| ValidationError::new().with_issue(["params"], e.to_string()))?;
    serde_urlencoded::from_str(&encoded).map_err(|e| ValidationError::new().with_issue(["params"], e.to_string()))
}

/// Query string deserialized into `T`; a missing query is an empty one.
///
/// The form decoding is flat: each key maps to one scalar. Repeated keys
/// (`tag=a&tag=b`) and bracket nesting (`a[b]=1`) are not collected into
/// sequences or maps, so a `Vec` field is reported as a `query` issue.
/// Read such queries through `serde_json::Value` or split a single
/// delimited value instead.
pub fn query<T: DeserializeOwned>(req: &Request) -> Result<T, ValidationError> {
    let raw = req.uri().query().unwrap_or_default();
    serde_urlencoded::from_str(raw).map_err(|e| ValidationError::new().with_issue(["query"], e.to_string()))
}

/// Take the request body and deserialize it as JSON.
///
/// The body is consumed; later readers see it empty.
pub async fn json_body<T: DeserializeOwned>(req: &mut Request) -> Result<T, ValidationError> {
    let body = std::mem::take(req.body_mut());
    let bytes = axum::body::to_bytes(body, MAX_JSON_BODY)
        .await
        .map_err(|e| ValidationError::new().with_issue(["body"], format!("unreadable body: {e}")))?;

    if bytes.is_empty() {
        return Err(ValidationError::new().with_issue(["body"], "expected a JSON body"));
    }

    serde_json::from_slice(&bytes).map_err(|e| ValidationError::new().with_issue(["body"], e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    use crate::routing::params::RouteParams;

    #[derive(Debug, Deserialize, PartialEq)]
    struct UserPath {
        id: u32,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Paging {
        page: Option<u32>,
        #[serde(default)]
        sort: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct NewUser {
        name: String,
    }

    #[test]
    fn test_params_parse_numbers() {
        let mut req = Request::new(Body::empty());
        req.extensions_mut()
            .insert(RouteParams::new([("id".to_string(), "42".to_string())]));
        assert_eq!(params::<UserPath>(&req).unwrap(), UserPath { id: 42 });

        req.extensions_mut()
            .insert(RouteParams::new([("id".to_string(), "abc".to_string())]));
        let err = params::<UserPath>(&req).unwrap_err();
        assert_eq!(err.issues()[0].path, vec!["params".to_string()]);
    }

    #[test]
    fn test_query() {
        let req = axum::http::Request::builder()
            .uri("/api/users?page=2&sort=name")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            query::<Paging>(&req).unwrap(),
            Paging {
                page: Some(2),
                sort: "name".into()
            }
        );

        let bare = Request::new(Body::empty());
        assert_eq!(query::<Paging>(&bare).unwrap().page, None);
    }

    #[test]
    fn test_query_is_flat() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Tags {
            tag: Vec<String>,
        }

        let req = axum::http::Request::builder()
            .uri("/api/posts?tag=a&tag=b")
            .body(Body::empty())
            .unwrap();
        let err = query::<Tags>(&req).unwrap_err();
        assert_eq!(err.issues()[0].path, vec!["query".to_string()]);
    }

    #[tokio::test]
    async fn test_json_body() {
        let mut req = Request::new(Body::from(r#"{"name":"ada"}"#));
        let user: NewUser = json_body(&mut req).await.unwrap();
        assert_eq!(user.name, "ada");

        // Consumed.
        assert!(json_body::<NewUser>(&mut req).await.is_err());

        let mut bad = Request::new(Body::from(r#"{"name":1}"#));
        let err = json_body::<NewUser>(&mut bad).await.unwrap_err();
        assert!(err.prettify().contains("→ at body"));
    }
}
