//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Health checker, gateway, lifecycle:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Observers only: nothing reads metrics or logs back into control flow
//! - Request ID flows from the gateway to the backend

pub mod logging;
pub mod metrics;
