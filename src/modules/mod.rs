//! Routing module discovery and registry.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     discovery.rs walks the API root (**/*.<ext>)
//!     → registry.rs pairs each module path with its ModuleCatalog builder
//!     → routers built once, registry shared behind Arc
//!
//! Per request:
//!     dispatcher → ModuleSource::load(module path) → Arc<Router>
//!
//! Optional:
//!     watcher.rs sees files come and go → clears resolution and hook caches
//! ```
//!
//! # Design Decisions
//! - Routing modules are compiled into the binary; the files on disk decide
//!   which of them are reachable and under which path
//! - Registration never happens lazily on first request

pub mod discovery;
pub mod registry;
pub mod watcher;

pub use discovery::{discover_modules, module_path};
pub use registry::{ModuleCatalog, ModuleRegistry, ModuleReport, ModuleSource, RouterBuilder};
pub use watcher::ModuleWatcher;
