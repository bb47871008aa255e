//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Map a response status onto a dispatch outcome level
//! - Emit the per-request outcome event
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - The outcome event always carries `method`, `url`, `status` and `outcome`
//!   so the level can be filtered without parsing the message

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("thunder_dispatch={default_level},tower_http={default_level}").into()
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Severity bucket of a finished dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeLevel {
    Success,
    Info,
    Warn,
    Error,
}

impl OutcomeLevel {
    /// `< 299` success, `< 399` info, `< 499` warn, everything else error.
    pub fn from_status(status: u16) -> Self {
        match status {
            0..=298 => OutcomeLevel::Success,
            299..=398 => OutcomeLevel::Info,
            399..=498 => OutcomeLevel::Warn,
            _ => OutcomeLevel::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeLevel::Success => "success",
            OutcomeLevel::Info => "info",
            OutcomeLevel::Warn => "warn",
            OutcomeLevel::Error => "error",
        }
    }
}

/// Emit one outcome event for a dispatched request.
pub fn log_outcome(method: &str, url: &str, status: u16) {
    let level = OutcomeLevel::from_status(status);
    let outcome = level.as_str();
    match level {
        OutcomeLevel::Success | OutcomeLevel::Info => {
            tracing::info!(method, url, status, outcome, "{} {} {}", method, url, status)
        }
        OutcomeLevel::Warn => tracing::warn!(method, url, status, outcome, "{} {} {}", method, url, status),
        OutcomeLevel::Error => tracing::error!(method, url, status, outcome, "{} {} {}", method, url, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_buckets() {
        assert_eq!(OutcomeLevel::from_status(200), OutcomeLevel::Success);
        assert_eq!(OutcomeLevel::from_status(298), OutcomeLevel::Success);
        assert_eq!(OutcomeLevel::from_status(299), OutcomeLevel::Info);
        assert_eq!(OutcomeLevel::from_status(302), OutcomeLevel::Info);
        assert_eq!(OutcomeLevel::from_status(400), OutcomeLevel::Warn);
        assert_eq!(OutcomeLevel::from_status(404), OutcomeLevel::Warn);
        assert_eq!(OutcomeLevel::from_status(499), OutcomeLevel::Error);
        assert_eq!(OutcomeLevel::from_status(500), OutcomeLevel::Error);
    }
}
