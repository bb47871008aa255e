//! Error taxonomy for the dispatch core.
//!
//! # Design Decisions
//! - Resolution and configuration failures are request-scoped: the dispatcher
//!   turns them into responses and never lets them cross into another request
//! - Handler and hook failures are values (`HandlerError`), not panics; the
//!   executor maps them onto 400/500 responses
//! - Messages never carry stack traces; verbosity is the logger's concern

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors raised while resolving and loading a routing module.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The pathname does not map onto a module under the API root.
    #[error("no routing module for path {0}")]
    NotFound(String),

    /// A resolved module is not a usable router.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Filesystem failure while walking module roots.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// A single schema violation reported by a handler or hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Location of the offending value, outermost key first.
    pub path: Vec<String>,
    pub message: String,
}

/// Schema-validation failure. Surfaces as HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-issue error with no path.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new().with_issue(Vec::<String>::new(), message)
    }

    /// Append an issue located at `path`.
    pub fn with_issue<P, S>(mut self, path: P, message: impl Into<String>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.issues.push(ValidationIssue {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        });
        self
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Human-readable summary, one block per issue.
    ///
    /// ```text
    /// ✖ expected a number
    ///   → at user.age
    /// ```
    pub fn prettify(&self) -> String {
        let mut out = String::new();
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str("✖ ");
            out.push_str(&issue.message);
            if !issue.path.is_empty() {
                out.push_str("\n  → at ");
                out.push_str(&issue.path.join("."));
            }
        }
        out
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prettify())
    }
}

impl std::error::Error for ValidationError {}

/// Failure outcome of a handler or hook.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Input did not satisfy the handler's shape. Mapped to 400.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Any other failure. The payload is returned verbatim with a 500.
    #[error("handler failed: {0}")]
    Failure(serde_json::Value),
}

impl HandlerError {
    /// Wrap an arbitrary error as a 500 payload using its display form.
    pub fn failure(err: impl fmt::Display) -> Self {
        Self::Failure(serde_json::Value::String(err.to_string()))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::failure(err)
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        Self::failure(err)
    }
}
