//! Response handling and gateway errors.
//!
//! # Design Decisions
//! - Backend responses are streamed back, never buffered
//! - Hop-by-hop headers are stripped from relayed responses
//! - "No backend available" (503) and "backend call failed" (502) stay distinct

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hyper::body::Incoming;
use std::time::Duration;
use thiserror::Error;

use crate::http::headers::strip_hop_by_hop;

/// Failures surfaced to the client by the gateway.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Every backend is currently excluded from selection.
    #[error("no backend available")]
    NoBackendAvailable,

    #[error("could not build upstream request: {0}")]
    InvalidUpstreamRequest(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NoBackendAvailable => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::InvalidUpstreamRequest(_)
            | ProxyError::Upstream(_)
            | ProxyError::UpstreamTimeout(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match self {
            ProxyError::NoBackendAvailable => "No backend available",
            _ => "Upstream request failed",
        };
        (self.status(), message).into_response()
    }
}

/// Turn a backend response into the client response.
pub fn relay(response: hyper::Response<Incoming>) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
