//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher, resolver, hook loader produce:
//!     → logging.rs (structured events, per-request outcome level)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows in from the transport layer's span
//! - Metrics are cheap (atomic increments) and no-ops without a recorder

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, log_outcome, OutcomeLevel};
