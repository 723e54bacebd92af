//! Shared utilities for integration and load testing.
#![allow(dead_code)]

use axum::Router;
use health_balancer::config::BalancerConfig;
use health_balancer::{LoadBalancer, Shutdown};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Start a simple mock backend that returns a fixed 200 response.
pub async fn start_mock_backend(response: &'static str) -> (SocketAddr, JoinHandle<()>) {
    start_programmable_backend(move |_path| async move { (200, response.to_string()) }).await
}

/// Start a programmable mock backend.
///
/// `f` receives the request path and returns status and body. Aborting the
/// returned handle closes the listener.
pub async fn start_programmable_backend<F, Fut>(f: F) -> (SocketAddr, JoinHandle<()>)
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        respond(socket, f).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, handle)
}

async fn respond<F, Fut>(mut socket: TcpStream, f: Arc<F>)
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = (u16, String)>,
{
    let Some(path) = read_request_path(&mut socket).await else {
        return;
    };
    let (status, body) = f(path).await;
    let status_text = match status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        502 => "502 Bad Gateway",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_text,
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Read the request head and return its path. Bodies are ignored.
async fn read_request_path(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    head.split_whitespace().nth(1).map(str::to_string)
}

/// Serve an Axum app on an ephemeral port.
pub async fn start_axum_backend(app: Router) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, handle)
}

/// Config for a balancer on an ephemeral port with fast health checks.
pub fn test_config(backends: &[SocketAddr]) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;
    config.initial_addresses = backends.iter().map(|a| format!("http://{}", a)).collect();
    config.health_check.interval_ms = 100;
    config.health_check.down_interval_ms = 100;
    config.health_check.timeout_ms = 300;
    config.health_check.unhealthy_threshold_ms = 150;
    config.timeouts.request_ms = 2_000;
    config
}

/// A balancer running in the background.
pub struct RunningBalancer {
    pub addr: SocketAddr,
    pub registry: Arc<health_balancer::health::StatusRegistry>,
    pub selector: Arc<health_balancer::load_balancer::BackendSelector>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

impl RunningBalancer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn state_of(&self, backend: SocketAddr) -> health_balancer::health::HealthState {
        self.registry.get(&format!("http://{}", backend))
    }
}

/// Build, bind and serve a balancer for `config`.
pub async fn start_balancer(config: BalancerConfig) -> RunningBalancer {
    let balancer = LoadBalancer::new(config).unwrap();
    let listener = balancer.bind().await.unwrap();
    let addr = listener.local_addr().unwrap();
    let registry = balancer.registry().clone();
    let selector = balancer.selector().clone();
    let shutdown = Shutdown::new();

    let serve_shutdown = shutdown.clone();
    let handle = tokio::spawn(async move {
        let _ = balancer.serve(listener, &serve_shutdown).await;
    });

    // Both sweep loops and the gateway subscribe once serving starts.
    wait_for(Duration::from_secs(2), || shutdown.receiver_count() >= 3).await;

    RunningBalancer {
        addr,
        registry,
        selector,
        shutdown,
        handle,
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub async fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
