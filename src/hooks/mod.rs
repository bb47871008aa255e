//! Hook subsystem.
//!
//! # Data Flow
//! ```text
//! First dispatch:
//!     loader.rs walks the hooks root (**/*.<ext>)
//!     → look up each module in the HookCatalog
//!     → keep hooks that define pre and/or post
//!     → stable sort, highest priority first
//!     → store in HookCache
//!
//! Later dispatches:
//!     HookCache hit, no filesystem access
//! ```
//!
//! # Design Decisions
//! - Hooks are registered in code and enabled by their file being present
//! - Same order for pre and post phases (not reversed)
//! - The cache is an injected object so tests and the watcher can reset it

pub mod hook;
pub mod loader;

pub use hook::{post_fn, pre_fn, Hook, HookResult, HookScope, PostHook, PreHook};
pub use loader::{HookCache, HookCatalog, HookList, HookLoader};
