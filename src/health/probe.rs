//! Single timed health probe.
//!
//! # Responsibilities
//! - GET `backend + path` once
//! - Measure latency until the response head arrives (body is never read)
//! - Enforce a hard deadline over connect + request + first byte
//!
//! The probe never touches the registry; classification belongs to the
//! checker.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time;

use crate::load_balancer::Backend;

/// Outcome of one probe: a completed probe or the reason it failed.
pub type ProbeResult = Result<ProbeOutcome, ProbeError>;

/// A probe that received a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// HTTP status of the health endpoint.
    pub status: StatusCode,
    /// Time from request start to the response head.
    pub latency: Duration,
}

/// Errors that can occur during a probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("could not build health check request: {0}")]
    Build(#[from] axum::http::Error),

    #[error("health check failed after {elapsed:?}: {source}")]
    Request {
        #[source]
        source: hyper_util::client::legacy::Error,
        elapsed: Duration,
    },

    #[error("health check timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },
}

impl ProbeError {
    /// Time spent before the probe failed.
    pub fn elapsed(&self) -> Duration {
        match self {
            ProbeError::Build(_) => Duration::ZERO,
            ProbeError::Request { elapsed, .. } | ProbeError::Timeout { elapsed } => *elapsed,
        }
    }
}

/// Issues health probes against backends.
///
/// Cheap to clone; clones share the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: Client<HttpConnector, Body>,
    path: String,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(path: impl Into<String>, timeout: Duration) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_nodelay(true);

        // Fresh connection per probe: every probe pays connect time against
        // its deadline, and a dead backend cannot hide behind a pooled socket.
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(connector);

        Self {
            client,
            path: path.into(),
            timeout,
        }
    }

    /// The deadline applied to each probe.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe `backend` once.
    pub async fn probe(&self, backend: &Backend) -> ProbeResult {
        let request = Request::builder()
            .method(Method::GET)
            .uri(backend.health_uri(&self.path)?)
            .header(header::USER_AGENT, "health-balancer-probe")
            .body(Body::empty())?;

        let start = Instant::now();
        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => Ok(ProbeOutcome {
                status: response.status(),
                latency: start.elapsed(),
            }),
            Ok(Err(source)) => Err(ProbeError::Request {
                source,
                elapsed: start.elapsed(),
            }),
            Err(_) => Err(ProbeError::Timeout {
                elapsed: start.elapsed(),
            }),
        }
    }
}
