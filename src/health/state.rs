//! Backend health states and probe classification.
//!
//! # States
//! - Unknown: not probed yet (cold start)
//! - Healthy: 200 within the latency threshold
//! - HighLatency: 200 but slower than the threshold
//! - Down: probe failed, timed out, or returned a non-200 status
//!
//! # State Transitions
//! ```text
//! Any state → classify(latest probe)
//! ```
//!
//! # Design Decisions
//! - No hysteresis: every completed probe fully determines the next state
//! - A timeout is a failure, never a latency measurement

use axum::http::StatusCode;
use std::fmt;
use std::time::Duration;

use crate::health::probe::ProbeResult;

/// Health classification of a backend.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HealthState {
    #[default]
    Unknown = 0,
    Healthy = 1,
    HighLatency = 2,
    Down = 3,
}

impl HealthState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthState::Unknown => "unknown",
            HealthState::Healthy => "healthy",
            HealthState::HighLatency => "high_latency",
            HealthState::Down => "down",
        }
    }

    /// Whether the alive sweep owns this state (the down sweep owns the rest).
    pub fn is_alive(&self) -> bool {
        matches!(self, HealthState::Healthy | HealthState::HighLatency)
    }
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive a state from one completed probe.
pub fn classify(result: &ProbeResult, unhealthy_threshold: Duration) -> HealthState {
    match result {
        Err(_) => HealthState::Down,
        Ok(outcome) if outcome.status != StatusCode::OK => HealthState::Down,
        Ok(outcome) if outcome.latency > unhealthy_threshold => HealthState::HighLatency,
        Ok(_) => HealthState::Healthy,
    }
}
