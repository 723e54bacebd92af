//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, backend
//! - `proxy_request_duration_seconds` (histogram): gateway latency
//! - `health_probe_duration_seconds` (histogram): probe latency per backend
//! - `health_probe_failures_total` (counter): failed probes per backend
//! - `backend_health_state` (gauge): 0=unknown, 1=healthy, 2=high latency, 3=down
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::health::HealthState;

/// Install the Prometheus exporter with an HTTP scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one request handled by the gateway.
pub fn record_request(method: &str, status: u16, backend: &str, start: Instant) {
    counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "backend" => backend.to_string()
    )
    .increment(1);
    histogram!("proxy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one completed or failed probe.
pub fn record_probe(backend: &str, elapsed: Duration, failed: bool) {
    histogram!("health_probe_duration_seconds", "backend" => backend.to_string())
        .record(elapsed.as_secs_f64());
    if failed {
        counter!("health_probe_failures_total", "backend" => backend.to_string()).increment(1);
    }
}

/// Record the state just written for `backend`.
pub fn record_backend_health(backend: &str, state: HealthState) {
    gauge!("backend_health_state", "backend" => backend.to_string()).set(state as u8 as f64);
}
