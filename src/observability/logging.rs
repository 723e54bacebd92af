//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level when set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `level` is a bare level ("info") or a full filter directive
/// ("health_balancer=debug,tower_http=info").
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if let Err(e) = result {
        tracing::warn!(error = %e, "Logging already initialized");
    }
}

fn default_filter(level: &str) -> EnvFilter {
    if level.contains('=') {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(format!("health_balancer={level},tower_http={level}"))
    }
}
