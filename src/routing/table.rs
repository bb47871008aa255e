//! Per-method pattern tables.
//!
//! # Design Decisions
//! - Insertion order is precedence: the first structural match wins
//! - A table exists only once something was registered under its method
//! - The wildcard table is separate and always consulted after the exact one

use std::collections::HashMap;

use axum::http::Method;

use crate::routing::handler::HandlerFactory;
use crate::routing::pattern::CompiledPattern;

/// Method key for registration. `All` targets the wildcard table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Exact(Method),
    All,
}

impl From<Method> for RouteMethod {
    fn from(method: Method) -> Self {
        RouteMethod::Exact(method)
    }
}

impl std::fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteMethod::Exact(m) => write!(f, "{}", m),
            RouteMethod::All => write!(f, "ALL"),
        }
    }
}

/// A compiled pattern bound to its handler factory. Immutable once built.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    pub pattern: CompiledPattern,
    pub factory: HandlerFactory,
}

/// Ordered routes grouped by method.
#[derive(Debug, Default)]
pub struct PatternTable {
    exact: HashMap<Method, Vec<RoutePattern>>,
    wildcard: Vec<RoutePattern>,
}

impl PatternTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, method: RouteMethod, route: RoutePattern) {
        match method {
            RouteMethod::Exact(m) => self.exact.entry(m).or_default().push(route),
            RouteMethod::All => self.wildcard.push(route),
        }
    }

    /// Routes registered for exactly `method`, if that table exists.
    pub fn exact(&self, method: &Method) -> Option<&[RoutePattern]> {
        self.exact.get(method).map(Vec::as_slice)
    }

    /// Wildcard routes, if that table exists.
    pub fn wildcard(&self) -> Option<&[RoutePattern]> {
        (!self.wildcard.is_empty()).then_some(self.wildcard.as_slice())
    }

    /// Candidate tables for `method` in lookup order.
    pub fn candidates(&self, method: &Method) -> impl Iterator<Item = &[RoutePattern]> {
        self.exact(method).into_iter().chain(self.wildcard())
    }

    /// First route in lookup order whose pattern accepts `path`.
    pub fn find(&self, method: &Method, path: &str) -> Option<&RoutePattern> {
        self.candidates(method)
            .flat_map(|routes| routes.iter())
            .find(|route| route.pattern.is_match(path))
    }

    /// Every registered route with its method, exact tables first.
    pub fn iter(&self) -> impl Iterator<Item = (RouteMethod, &RoutePattern)> {
        let mut methods: Vec<_> = self.exact.keys().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        let exact = methods.into_iter().flat_map(move |m| {
            self.exact[m]
                .iter()
                .map(move |r| (RouteMethod::Exact(m.clone()), r))
        });
        exact.chain(self.wildcard.iter().map(|r| (RouteMethod::All, r)))
    }

    pub fn len(&self) -> usize {
        self.exact.values().map(Vec::len).sum::<usize>() + self.wildcard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
