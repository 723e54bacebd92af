//! The load balancer instance.
//!
//! Owns the backend list, the status registry, the selector and the health
//! checker. Constructed explicitly from configuration and handed to `serve`.

use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::{BalancerConfig, Protocol};
use crate::health::{HealthChecker, StatusRegistry};
use crate::http::ProxyGateway;
use crate::lifecycle::Shutdown;
use crate::load_balancer::{Backend, BackendError, BackendSelector, SelectionPolicy};

#[derive(Debug, Error)]
pub enum BalancerError {
    #[error("invalid backend: {0}")]
    Backend(#[from] BackendError),

    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    #[error("protocol {0} is not supported")]
    UnsupportedProtocol(Protocol),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A configured balancer: backends, health state and selection.
#[derive(Debug)]
pub struct LoadBalancer {
    config: BalancerConfig,
    backends: Arc<[Backend]>,
    registry: Arc<StatusRegistry>,
    selector: Arc<BackendSelector>,
    checker: Arc<HealthChecker>,
}

impl LoadBalancer {
    /// Build a balancer with every backend in state `Unknown`.
    ///
    /// Fails if `config` does not validate.
    pub fn new(config: BalancerConfig) -> Result<Self, BalancerError> {
        validate_config(&config).map_err(BalancerError::Invalid)?;

        let backends: Arc<[Backend]> = config
            .initial_addresses
            .iter()
            .map(|address| Backend::parse(address))
            .collect::<Result<Vec<_>, _>>()?
            .into();

        let registry = Arc::new(StatusRegistry::new(&backends));
        let policy = SelectionPolicy {
            exclude_high_latency: config.health_check.exclude_high_latency,
        };
        let selector = Arc::new(BackendSelector::new(backends.clone(), registry.clone(), policy));
        let checker = Arc::new(HealthChecker::new(
            backends.clone(),
            registry.clone(),
            config.health_check.clone(),
        ));

        tracing::info!(
            backends = backends.len(),
            exclude_high_latency = policy.exclude_high_latency,
            "Load balancer initialized"
        );

        Ok(Self {
            config,
            backends,
            registry,
            selector,
            checker,
        })
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    pub fn registry(&self) -> &Arc<StatusRegistry> {
        &self.registry
    }

    pub fn selector(&self) -> &Arc<BackendSelector> {
        &self.selector
    }

    pub fn checker(&self) -> &Arc<HealthChecker> {
        &self.checker
    }

    /// Bind the configured listener address.
    pub async fn bind(&self) -> Result<TcpListener, BalancerError> {
        let listener = TcpListener::bind(self.config.listener.bind_address()).await?;
        Ok(listener)
    }

    /// Serve inbound traffic on `listener` until `shutdown` fires.
    ///
    /// Starts the health checker before accepting connections; the initial
    /// sweep does not delay serving.
    pub async fn serve(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), BalancerError> {
        match self.config.listener.protocol {
            Protocol::Http => {}
            other => return Err(BalancerError::UnsupportedProtocol(other)),
        }

        let loops = self.checker.start(shutdown);
        let gateway = ProxyGateway::new(self.selector.clone(), &self.config.timeouts);
        let result = gateway.run(listener, shutdown.subscribe()).await;

        for handle in loops {
            handle.abort();
        }
        tracing::info!("Load balancer stopped");
        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthState;

    fn config(addresses: &[&str]) -> BalancerConfig {
        BalancerConfig {
            initial_addresses: addresses.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn starts_with_every_backend_unknown() {
        let balancer = LoadBalancer::new(config(&["http://10.0.0.1:80", "http://10.0.0.2:80"])).unwrap();
        assert_eq!(balancer.registry().len(), 2);
        for backend in balancer.backends() {
            assert_eq!(balancer.registry().get(backend.address()), HealthState::Unknown);
        }
    }

    #[test]
    fn malformed_address_fails_construction() {
        match LoadBalancer::new(config(&["http://10.0.0.1:80", "not a url"])) {
            Err(BalancerError::Invalid(errors)) => {
                assert!(matches!(errors[..], [ValidationError::InvalidBackend(_)]));
            }
            other => panic!("expected invalid config, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_pool_fails_construction() {
        match LoadBalancer::new(config(&[])) {
            Err(BalancerError::Invalid(errors)) => assert_eq!(errors, vec![ValidationError::NoBackends]),
            other => panic!("expected invalid config, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn zero_sweep_interval_fails_construction() {
        let mut zero_alive = config(&["http://10.0.0.1:80"]);
        zero_alive.health_check.interval_ms = 0;
        match LoadBalancer::new(zero_alive) {
            Err(BalancerError::Invalid(errors)) => {
                assert_eq!(errors, vec![ValidationError::NotPositive("health_check.interval_ms")]);
            }
            other => panic!("expected invalid config, got {:?}", other.map(|_| ())),
        }

        let mut zero_down = config(&["http://10.0.0.1:80"]);
        zero_down.health_check.down_interval_ms = 0;
        assert!(matches!(LoadBalancer::new(zero_down), Err(BalancerError::Invalid(_))));
    }

    #[tokio::test]
    async fn rpc_protocol_is_rejected() {
        let mut config = config(&["http://127.0.0.1:1"]);
        config.listener.protocol = Protocol::Rpc;
        let balancer = LoadBalancer::new(config).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let result = balancer.serve(listener, &Shutdown::new()).await;
        assert!(matches!(result, Err(BalancerError::UnsupportedProtocol(Protocol::Rpc))));
    }
}
