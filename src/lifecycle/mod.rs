//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → LoadBalancer::new → bind → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → sweep loops exit → serve future dropped → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - No drain phase: in-flight work is abandoned on shutdown

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
