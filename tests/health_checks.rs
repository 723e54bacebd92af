//! Health checking against live mock backends.

use axum::{routing::get, Router};
use health_balancer::health::{HealthState, SweepKind};
use health_balancer::LoadBalancer;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod common;

#[tokio::test]
async fn test_initial_sweep_classifies_backends() {
    let (healthy, _h1) = common::start_mock_backend("ok").await;
    let (failing, _h2) = common::start_programmable_backend(|_| async { (500, "boom".into()) }).await;
    let (slow, _h3) = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        (200, "slow".into())
    })
    .await;
    let (hanging, _h4) = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, "late".into())
    })
    .await;

    let mut config = common::test_config(&[healthy, failing, slow, hanging]);
    config.health_check.unhealthy_threshold_ms = 150;
    config.health_check.timeout_ms = 800;
    let balancer = LoadBalancer::new(config).unwrap();

    let sweep = balancer.checker().sweep(SweepKind::Initial);
    assert_eq!(sweep.len(), 4);
    sweep.wait().await;

    let registry = balancer.registry();
    let state = |addr| registry.get(&format!("http://{}", addr));
    assert_eq!(state(healthy), HealthState::Healthy);
    assert_eq!(state(failing), HealthState::Down);
    assert_eq!(state(slow), HealthState::HighLatency);
    assert_eq!(state(hanging), HealthState::Down);
}

#[tokio::test]
async fn test_periodic_sweeps_partition_by_state() {
    let probes = Arc::new(AtomicU32::new(0));
    let counter = probes.clone();
    let (backend, _handle) = common::start_programmable_backend(move |_| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (503, "draining".into())
        }
    })
    .await;

    let balancer = LoadBalancer::new(common::test_config(&[backend])).unwrap();
    let checker = balancer.checker();

    checker.sweep(SweepKind::Initial).wait().await;
    assert_eq!(balancer.registry().get(&format!("http://{}", backend)), HealthState::Down);
    assert_eq!(probes.load(Ordering::SeqCst), 1);

    // a down backend is only probed by the down sweep
    let alive = checker.sweep(SweepKind::Alive);
    assert!(alive.is_empty());
    alive.wait().await;
    assert_eq!(probes.load(Ordering::SeqCst), 1);

    checker.sweep(SweepKind::Down).wait().await;
    assert_eq!(probes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_down_backend_recovers() {
    let healthy = Arc::new(AtomicBool::new(false));
    let flag = healthy.clone();
    let (backend, _handle) = common::start_programmable_backend(move |_| {
        let flag = flag.clone();
        async move {
            if flag.load(Ordering::SeqCst) {
                (200, "ok".into())
            } else {
                (500, "starting".into())
            }
        }
    })
    .await;

    let running = common::start_balancer(common::test_config(&[backend])).await;

    assert!(
        common::wait_for(Duration::from_secs(2), || running.state_of(backend) == HealthState::Down).await,
        "backend should be marked down"
    );
    assert!(running.selector.next().is_none());

    healthy.store(true, Ordering::SeqCst);

    assert!(
        common::wait_for(Duration::from_secs(2), || running.state_of(backend) == HealthState::Healthy).await,
        "backend should recover on the down sweep"
    );
    assert!(running.selector.next().is_some());

    running.shutdown.trigger();
}

#[tokio::test]
async fn test_crashed_backend_is_evicted() {
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/", get(|| async { "b1" }));
    let (b1, b1_handle) = common::start_axum_backend(app).await;
    let (b2, _b2_handle) = common::start_mock_backend("b2").await;

    let running = common::start_balancer(common::test_config(&[b1, b2])).await;

    assert!(
        common::wait_for(Duration::from_secs(2), || {
            running.state_of(b1) == HealthState::Healthy && running.state_of(b2) == HealthState::Healthy
        })
        .await
    );

    b1_handle.abort();

    assert!(
        common::wait_for(Duration::from_secs(2), || running.state_of(b1) == HealthState::Down).await,
        "crashed backend should be marked down"
    );

    let client = common::client();
    for _ in 0..6 {
        let body = client.get(running.url("/")).send().await.unwrap().text().await.unwrap();
        assert_eq!(body, "b2");
    }

    running.shutdown.trigger();
}

#[tokio::test]
async fn test_sole_backend_crash_leaves_nothing_selectable() {
    let (backend, handle) = common::start_mock_backend("only").await;
    let running = common::start_balancer(common::test_config(&[backend])).await;

    assert!(common::wait_for(Duration::from_secs(2), || running.state_of(backend) == HealthState::Healthy).await);
    assert!(running.selector.next().is_some());

    handle.abort();

    assert!(common::wait_for(Duration::from_secs(2), || running.state_of(backend) == HealthState::Down).await);
    assert!(running.selector.next().is_none());

    let res = common::client().get(running.url("/")).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);

    running.shutdown.trigger();
}

#[tokio::test]
async fn test_shutdown_stops_serving() {
    let (backend, _handle) = common::start_mock_backend("ok").await;
    let running = common::start_balancer(common::test_config(&[backend])).await;

    running.shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(2), running.handle)
        .await
        .expect("serve should return after shutdown")
        .unwrap();
}
