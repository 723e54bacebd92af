//! Backend selection against live health state.
//!
//! # Responsibilities
//! - Hold the ordered, immutable backend list
//! - Apply the strategy, skipping backends the policy rejects
//! - Read the registry once per candidate (snapshot semantics)

use std::sync::Arc;

use crate::health::{HealthState, StatusRegistry};
use crate::load_balancer::{backend::Backend, round_robin::RoundRobin, Strategy};

/// Which health states may receive traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionPolicy {
    /// Treat HighLatency like Down.
    pub exclude_high_latency: bool,
}

impl SelectionPolicy {
    /// Whether a backend in `state` may be selected.
    ///
    /// Unknown is admitted so a cold pool serves traffic before the first
    /// probe completes.
    pub fn admits(&self, state: HealthState) -> bool {
        match state {
            HealthState::Down => false,
            HealthState::HighLatency => !self.exclude_high_latency,
            HealthState::Unknown | HealthState::Healthy => true,
        }
    }
}

/// Picks the next backend for a request.
#[derive(Debug)]
pub struct BackendSelector {
    backends: Arc<[Backend]>,
    registry: Arc<StatusRegistry>,
    strategy: Box<dyn Strategy>,
    policy: SelectionPolicy,
}

impl BackendSelector {
    /// Round-robin selector over `backends`.
    pub fn new(backends: Arc<[Backend]>, registry: Arc<StatusRegistry>, policy: SelectionPolicy) -> Self {
        Self::with_strategy(backends, registry, policy, Box::new(RoundRobin::new()))
    }

    pub fn with_strategy(
        backends: Arc<[Backend]>,
        registry: Arc<StatusRegistry>,
        policy: SelectionPolicy,
        strategy: Box<dyn Strategy>,
    ) -> Self {
        Self {
            backends,
            registry,
            strategy,
            policy,
        }
    }

    /// The next eligible backend, or `None` if every backend is rejected.
    pub fn next(&self) -> Option<&Backend> {
        let selected = self.strategy.next_server(&self.backends, &|backend| {
            self.policy.admits(self.registry.get(backend.address()))
        });

        if selected.is_none() {
            tracing::debug!(backend_count = self.backends.len(), "No eligible backends");
            for (address, state) in self.registry.snapshot() {
                tracing::debug!(backend = %address, state = %state, "Backend status");
            }
        }
        selected
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }
}
