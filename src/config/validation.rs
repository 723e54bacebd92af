//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every backend address is a usable base URL
//! - Value ranges (durations and thresholds > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::load_balancer::backend::{Backend, BackendError};

/// A single semantic problem with a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("initial_addresses cannot be empty")]
    NoBackends,

    #[error("invalid backend address: {0}")]
    InvalidBackend(#[from] BackendError),

    #[error("listener host cannot be empty")]
    EmptyHost,

    #[error("health check path must start with '/': {0:?}")]
    InvalidHealthPath(String),

    #[error("{0} must be positive")]
    NotPositive(&'static str),
}

/// Check a configuration, collecting every violation.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.initial_addresses.is_empty() {
        errors.push(ValidationError::NoBackends);
    }
    for address in &config.initial_addresses {
        if let Err(e) = Backend::parse(address) {
            errors.push(e.into());
        }
    }

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    let health = &config.health_check;
    if !health.path.starts_with('/') {
        errors.push(ValidationError::InvalidHealthPath(health.path.clone()));
    }

    let positive = [
        ("health_check.interval_ms", health.interval_ms),
        ("health_check.down_interval_ms", health.down_interval_ms),
        ("health_check.timeout_ms", health.timeout_ms),
        ("health_check.unhealthy_threshold_ms", health.unhealthy_threshold_ms),
        ("timeouts.request_ms", config.timeouts.request_ms),
    ];
    for (name, value) in positive {
        if value == 0 {
            errors.push(ValidationError::NotPositive(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
