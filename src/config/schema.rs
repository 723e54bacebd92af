//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.
//! Durations are integer milliseconds, matching the on-disk format.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct BalancerConfig {
    /// Inbound listener (host, port, protocol).
    pub listener: ListenerConfig,

    /// Ordered backend base URLs (e.g., "http://10.0.0.1:3000").
    /// Order defines the round-robin cycle.
    pub initial_addresses: Vec<String>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Timeout configuration for forwarded requests.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind.
    pub host: String,

    /// Port to bind. Zero picks an ephemeral port.
    pub port: u16,

    /// Serving protocol.
    pub protocol: Protocol,
}

impl ListenerConfig {
    /// The `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            protocol: Protocol::Http,
        }
    }
}

/// Serving protocol selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// HTTP reverse proxy.
    #[default]
    Http,
    /// RPC serving. Accepted in configuration, rejected when serving.
    Rpc,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => f.write_str("http"),
            Protocol::Rpc => f.write_str("rpc"),
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Path appended to each backend address when probing.
    pub path: String,

    /// Alive sweep period (backends not Down/Unknown), in milliseconds.
    pub interval_ms: u64,

    /// Down sweep period (backends Down/Unknown), in milliseconds.
    pub down_interval_ms: u64,

    /// Hard deadline for a single probe, in milliseconds.
    pub timeout_ms: u64,

    /// Latency above which a 200 response is classified HighLatency.
    pub unhealthy_threshold_ms: u64,

    /// Skip HighLatency backends during selection.
    pub exclude_high_latency: bool,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn down_interval(&self) -> Duration {
        Duration::from_millis(self.down_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn unhealthy_threshold(&self) -> Duration {
        Duration::from_millis(self.unhealthy_threshold_ms)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            path: "/health".to_string(),
            interval_ms: 1_000,
            down_interval_ms: 5_000,
            timeout_ms: 500,
            unhealthy_threshold_ms: 200,
            exclude_high_latency: false,
        }
    }
}

/// Timeout configuration for forwarded requests.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline until the backend's response head arrives, in milliseconds.
    pub request_ms: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 30_000 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
