//! Request pathname → routing module.
//!
//! ```text
//! /api/v1/users/42
//!     → strip "/api/"
//!     → probe v1 (dir) → probe users (users.rs)
//!     → Resolution { module: "v1/users", remaining: ["42"] }
//! ```

pub mod cache;
pub mod resolver;

pub use cache::ResolutionCache;
pub use resolver::{PathResolver, Resolution, SharedResolver, DEFAULT_MAX_DEPTH, INDEX_MODULE};
