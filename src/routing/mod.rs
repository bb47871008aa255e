//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Module load (startup):
//!     Router::new(name)
//!     → get/post/put/patch/delete/all(pattern, handler name, factory)
//!     → pattern.rs (compile once)
//!     → table.rs (append to the method's ordered table)
//!
//! Per request:
//!     Router::match_route(method, remaining path)
//!     → exact-method table, then wildcard table, insertion order
//!     → first structural match: run factory, capture params
//!     → Executor (or direct 404 / unmatched)
//! ```
//!
//! # Design Decisions
//! - Precedence is registration order, not pattern specificity
//! - No regex: patterns compile to literal/param/splat segments
//! - Routers are immutable once shared, so matching needs no locks

pub mod handler;
pub mod params;
pub mod pattern;
pub mod router;
pub mod table;

pub use handler::{async_handler_fn, handler_fn, Handler, HandlerFactory, HandlerResult, IoShape, Prepared};
pub use params::{RequestParamsExt, RouteParams};
pub use router::{RouteInfo, RouteMatch, Router};
pub use table::RouteMethod;
