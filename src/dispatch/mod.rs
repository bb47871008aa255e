//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → dispatcher.rs: outside /<mount>/ → fallback.rs
//!     → PathResolver (cached) → module path + remaining segments
//!     → ModuleSource → Arc<Router>
//!     → Router::match_route(method, remaining)
//!         ├─ NoTables → direct 404
//!         ├─ Unmatched → fallback.rs
//!         └─ Found(Executor)
//!     → HookLoader (cached list)
//!     → executor.rs: PRE* → HANDLE → POST*
//!     → outcome log + metrics → Response
//! ```
//!
//! # Design Decisions
//! - Two error boundaries: the executor for handlers and hooks, the
//!   dispatcher for resolution and loading
//! - No timeouts here; the transport owns them

pub mod dispatcher;
pub mod executor;
pub mod fallback;

pub use dispatcher::{Dispatcher, RequestCancellationExt};
pub use executor::Executor;
pub use fallback::{Fallback, NotFoundFallback};
