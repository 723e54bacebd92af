//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     initial sweep → probe every backend → classify → registry
//!
//! Alive timer (interval):
//!     backends Healthy/HighLatency → probe → classify → registry
//!
//! Down timer (down interval):
//!     backends Down/Unknown → probe → classify → registry
//!
//! Selection (every request):
//!     registry → BackendSelector (read only)
//! ```
//!
//! # Design Decisions
//! - Each backend belongs to exactly one periodic sweep, decided per tick
//! - Classification is stateless, so overlapping sweeps are harmless
//! - Request failures never write to the registry

pub mod checker;
pub mod probe;
pub mod registry;
pub mod state;

pub use checker::{HealthChecker, Sweep, SweepKind};
pub use probe::{HealthProbe, ProbeError, ProbeOutcome, ProbeResult};
pub use registry::StatusRegistry;
pub use state::{classify, HealthState};
