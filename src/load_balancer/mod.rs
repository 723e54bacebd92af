//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → selector.rs (BackendSelector::next)
//!     → Apply load balancing strategy:
//!         - round_robin.rs (rotate through backends)
//!     → StatusRegistry read per candidate (skip Down)
//!     → Return backend or None
//! ```
//!
//! # Design Decisions
//! - Backends are immutable; health lives in the registry, not on the backend
//! - The strategy owns its cursor; the selector owns the eligibility policy
//! - Strategies are a trait so other algorithms can be plugged in

pub mod backend;
pub mod round_robin;
pub mod selector;

pub use backend::{Backend, BackendError};
pub use round_robin::RoundRobin;
pub use selector::{BackendSelector, SelectionPolicy};

use std::fmt::Debug;

/// Trait for load balancing strategies.
pub trait Strategy: Send + Sync + Debug {
    /// Select the next backend among `backends`, considering only those for
    /// which `eligible` returns true.
    ///
    /// Returns `None` when no backend is eligible.
    fn next_server<'a>(
        &self,
        backends: &'a [Backend],
        eligible: &dyn Fn(&Backend) -> bool,
    ) -> Option<&'a Backend>;
}
