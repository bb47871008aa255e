//! Request-scoped path parameters.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::http::Request;

/// Parameters extracted by the matched pattern.
///
/// Immutable and cheap to clone; lives in the request extensions for the
/// duration of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    inner: Arc<BTreeMap<String, String>>,
}

impl RouteParams {
    pub fn new(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            inner: Arc::new(pairs.into_iter().collect()),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.inner
    }
}

/// Access route parameters on a request.
pub trait RequestParamsExt {
    /// Parameters of the matched route; empty outside a dispatch.
    fn params(&self) -> RouteParams;

    fn param(&self, name: &str) -> Option<String>;
}

impl RequestParamsExt for Request {
    fn params(&self) -> RouteParams {
        self.extensions()
            .get::<RouteParams>()
            .cloned()
            .unwrap_or_default()
    }

    fn param(&self, name: &str) -> Option<String> {
        self.extensions()
            .get::<RouteParams>()
            .and_then(|p| p.get(name))
            .map(str::to_string)
    }
}
