//! Active health checking.
//!
//! # Responsibilities
//! - Probe every backend once at startup (initial sweep)
//! - Re-probe alive backends on the alive interval
//! - Re-probe down/unknown backends on the down interval
//! - Classify each completed probe and write it to the registry
//!
//! Sweeps fan out one task per member and return without waiting, so ticks
//! stay on the wall clock even when probes are slow. Membership is decided
//! from the registry at fire time.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use crate::config::HealthCheckConfig;
use crate::health::probe::HealthProbe;
use crate::health::registry::StatusRegistry;
use crate::health::state::{classify, HealthState};
use crate::lifecycle::Shutdown;
use crate::load_balancer::Backend;
use crate::observability::metrics;

/// The trigger of a sweep, which decides its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    /// Every backend, once at startup.
    Initial,
    /// Backends currently Healthy or HighLatency.
    Alive,
    /// Backends currently Down or Unknown.
    Down,
}

impl SweepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepKind::Initial => "initial",
            SweepKind::Alive => "alive",
            SweepKind::Down => "down",
        }
    }

    /// Whether a backend currently in `state` belongs to this sweep.
    pub fn includes(&self, state: HealthState) -> bool {
        match self {
            SweepKind::Initial => true,
            SweepKind::Alive => state.is_alive(),
            SweepKind::Down => !state.is_alive(),
        }
    }
}

/// Probe tasks spawned by one sweep.
///
/// Dropping it detaches the tasks; they still run to completion.
#[derive(Debug)]
pub struct Sweep {
    kind: SweepKind,
    tasks: Vec<JoinHandle<()>>,
}

impl Sweep {
    /// Number of backends probed by this sweep.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait until every probe of this sweep has written its result.
    pub async fn wait(self) {
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::error!(sweep = self.kind.as_str(), error = %e, "Probe task failed");
            }
        }
    }
}

/// Runs the health sweeps and owns the write side of the registry.
#[derive(Debug)]
pub struct HealthChecker {
    backends: Arc<[Backend]>,
    registry: Arc<StatusRegistry>,
    probe: HealthProbe,
    config: HealthCheckConfig,
}

impl HealthChecker {
    pub fn new(backends: Arc<[Backend]>, registry: Arc<StatusRegistry>, config: HealthCheckConfig) -> Self {
        let probe = HealthProbe::new(config.path.clone(), config.timeout());
        Self {
            backends,
            registry,
            probe,
            config,
        }
    }

    /// Fire one sweep: spawn a probe task per member backend and return.
    pub fn sweep(self: &Arc<Self>, kind: SweepKind) -> Sweep {
        let mut tasks = Vec::new();
        for (index, backend) in self.backends.iter().enumerate() {
            if !kind.includes(self.registry.get(backend.address())) {
                continue;
            }
            let checker = Arc::clone(self);
            tasks.push(tokio::spawn(async move {
                checker.check(index, kind).await;
            }));
        }

        tracing::trace!(sweep = kind.as_str(), probes = tasks.len(), "Sweep fired");
        Sweep { kind, tasks }
    }

    /// Start the initial sweep and both periodic loops.
    ///
    /// Returns the loop handles; the loops exit when `shutdown` triggers.
    pub fn start(self: &Arc<Self>, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        tracing::info!(
            backends = self.backends.len(),
            path = %self.config.path,
            interval_ms = self.config.interval_ms,
            down_interval_ms = self.config.down_interval_ms,
            timeout = ?self.probe.timeout(),
            unhealthy_threshold_ms = self.config.unhealthy_threshold_ms,
            "Health checker starting"
        );

        self.sweep(SweepKind::Initial);

        vec![
            tokio::spawn(Arc::clone(self).run(SweepKind::Alive, self.config.interval(), shutdown.subscribe())),
            tokio::spawn(Arc::clone(self).run(SweepKind::Down, self.config.down_interval(), shutdown.subscribe())),
        ]
    }

    async fn run(self: Arc<Self>, kind: SweepKind, period: Duration, mut shutdown: broadcast::Receiver<()>) {
        // First tick one period from now, like a ticker.
        let mut ticker = time::interval_at(Instant::now() + period, period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep(kind);
                }
                _ = shutdown.recv() => {
                    tracing::info!(sweep = kind.as_str(), "Health sweep loop received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn check(&self, index: usize, kind: SweepKind) {
        let backend = &self.backends[index];
        let result = self.probe.probe(backend).await;

        match &result {
            Ok(outcome) => metrics::record_probe(backend.address(), outcome.latency, false),
            Err(e) => {
                tracing::warn!(backend = %backend, sweep = kind.as_str(), error = %e, "Health check failed");
                metrics::record_probe(backend.address(), e.elapsed(), true);
            }
        }

        let state = classify(&result, self.config.unhealthy_threshold());
        let previous = self.registry.set(backend.address(), state);
        metrics::record_backend_health(backend.address(), state);

        if previous == state {
            tracing::trace!(backend = %backend, state = %state, "Health unchanged");
            return;
        }
        match (&result, state) {
            (Ok(outcome), HealthState::Down) => tracing::warn!(
                backend = %backend, from = %previous, to = %state, status = %outcome.status,
                "Backend down: non-200 health response"
            ),
            (Err(_), _) => tracing::warn!(backend = %backend, from = %previous, to = %state, "Backend down"),
            (Ok(outcome), HealthState::HighLatency) => tracing::warn!(
                backend = %backend, from = %previous, to = %state, latency = ?outcome.latency,
                "Backend has high latency"
            ),
            _ => tracing::info!(backend = %backend, from = %previous, to = %state, "Backend health changed"),
        }
    }
}
