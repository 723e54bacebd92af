//! Concurrent backend → health state registry.
//!
//! Single source of truth read by selection on every request and written by
//! probe tasks. Single-key operations only; last write wins.

use dashmap::DashMap;

use crate::health::state::HealthState;
use crate::load_balancer::Backend;

/// A thread-safe map of backend address → current health state.
#[derive(Debug, Default)]
pub struct StatusRegistry {
    states: DashMap<String, HealthState>,
    /// Configured order, for snapshots.
    order: Vec<String>,
}

impl StatusRegistry {
    /// Create a registry with every backend set to `Unknown`.
    pub fn new(backends: &[Backend]) -> Self {
        let states = DashMap::with_capacity(backends.len());
        let mut order = Vec::with_capacity(backends.len());
        for backend in backends {
            states.insert(backend.address().to_string(), HealthState::Unknown);
            order.push(backend.address().to_string());
        }
        Self { states, order }
    }

    /// Current state of `address`; `Unknown` if it was never registered.
    pub fn get(&self, address: &str) -> HealthState {
        self.states
            .get(address)
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }

    /// Overwrite the state of `address`, returning the previous one.
    pub fn set(&self, address: &str, state: HealthState) -> HealthState {
        self.states
            .insert(address.to_string(), state)
            .unwrap_or_default()
    }

    /// Number of tracked backends.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// `(address, state)` pairs in configuration order.
    pub fn snapshot(&self) -> Vec<(String, HealthState)> {
        self.order
            .iter()
            .map(|address| (address.clone(), self.get(address)))
            .collect()
    }
}
