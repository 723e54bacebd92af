//! HTTP proxy gateway.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → BackendSelector picks a backend
//!     → headers.rs (forwarding headers, hop-by-hop removal)
//!     → upstream call with request timeout
//!     → response.rs (relay or 502/503)
//!     → Send to client
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::ProxyError;
pub use server::{GatewayState, ProxyGateway};
