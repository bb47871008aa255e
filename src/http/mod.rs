//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → Dispatcher (every path)
//!     → handlers use extract.rs for params, query, body
//!     → response.rs (JSON error bodies)
//!     → Send to client
//! ```

pub mod extract;
pub mod request;
pub mod response;
pub mod server;

/// Request type seen by handlers and hooks.
pub type Request = axum::extract::Request;

/// Response type produced by handlers and hooks.
pub type Response = axum::response::Response;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
