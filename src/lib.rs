//! Filesystem-convention HTTP dispatcher.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌───────────────────────────────────────────────────────────┐
//!                 │                     THUNDER DISPATCH                        │
//!                 │                                                             │
//!   Request       │  ┌────────┐   ┌────────────┐   ┌──────────┐   ┌─────────┐ │
//!   ──────────────┼─▶│  http  │──▶│ dispatcher │──▶│ resolve  │──▶│ modules │ │
//!                 │  │ server │   │            │   │ (cached) │   │registry │ │
//!                 │  └────────┘   └─────┬──────┘   └──────────┘   └────┬────┘ │
//!                 │                     │                              │      │
//!                 │                     │         ┌─────────────┐      │      │
//!                 │                     │◀────────│   routing   │◀─────┘      │
//!                 │                     │         │ match_route │             │
//!                 │                     ▼         └─────────────┘             │
//!   Response      │               ┌──────────┐    ┌─────────────┐             │
//!   ◀─────────────┼───────────────│ executor │◀───│    hooks    │             │
//!                 │               │ pre/h/post│    │  (cached)   │             │
//!                 │               └──────────┘    └─────────────┘             │
//!                 │                                                             │
//!                 │   config · observability · lifecycle · error                │
//!                 └───────────────────────────────────────────────────────────┘
//! ```
//!
//! A request under `/<mount>/` is walked against the API root on disk until a
//! routing module file is found. The module's router matches the rest of the
//! path, and the matched handler runs inside the prioritized hook pipeline.

// Core subsystems
pub mod dispatch;
pub mod hooks;
pub mod modules;
pub mod resolve;
pub mod routing;

// Transport
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::DispatchConfig;
pub use dispatch::{Dispatcher, Executor, Fallback, NotFoundFallback, RequestCancellationExt};
pub use error::{DispatchError, HandlerError, RouteError, ValidationError};
pub use hooks::{post_fn, pre_fn, Hook, HookCatalog, HookLoader, HookScope, PostHook, PreHook};
pub use http::{HttpServer, Request, Response};
pub use lifecycle::Shutdown;
pub use modules::{ModuleCatalog, ModuleRegistry, ModuleSource};
pub use resolve::{PathResolver, Resolution, ResolutionCache};
pub use routing::{async_handler_fn, handler_fn, Handler, HandlerResult, IoShape, Prepared, RouteMatch, RouteParams, Router};
