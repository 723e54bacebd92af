//! Proxy gateway: the inbound HTTP listener.
//!
//! # Responsibilities
//! - Accept every method on every path
//! - Ask the selector for a backend per request
//! - Forward with rewritten target and forwarding headers
//! - Stream the backend response back to the client
//!
//! Forwarding failures are answered with 502 and never written to the
//! health registry; only the health checker decides backend state.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, Version},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::time;
use tower_http::trace::TraceLayer;

use crate::config::TimeoutConfig;
use crate::http::headers::{set_forwarded, strip_hop_by_hop};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::{relay, ProxyError};
use crate::lifecycle::shutdown::triggered;
use crate::load_balancer::{Backend, BackendSelector};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub selector: Arc<BackendSelector>,
    pub client: Client<HttpConnector, Body>,
    pub request_timeout: Duration,
}

/// HTTP front end of the balancer.
pub struct ProxyGateway {
    router: Router,
}

impl ProxyGateway {
    pub fn new(selector: Arc<BackendSelector>, timeouts: &TimeoutConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = GatewayState {
            selector,
            client,
            request_timeout: timeouts.request(),
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: GatewayState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The router, for serving on a custom transport or in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Accept connections until `shutdown` fires.
    ///
    /// In-flight requests are abandoned on shutdown.
    pub async fn run(self, listener: TcpListener, shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP gateway starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        tokio::select! {
            result = axum::serve(listener, app).into_future() => result?,
            _ = triggered(shutdown) => {
                tracing::info!("HTTP gateway received shutdown signal, dropping connections");
            }
        }

        tracing::info!("HTTP gateway stopped");
        Ok(())
    }
}

/// Select a backend and forward the request to it.
async fn proxy_handler(State(state): State<GatewayState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let Some(backend) = state.selector.next() else {
        tracing::warn!(request_id = %request_id, method = %method, path = %request.uri().path(), "No backend available");
        metrics::record_request(method.as_str(), 503, "none", start_time);
        return ProxyError::NoBackendAvailable.into_response();
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %request.uri().path(),
        backend = %backend,
        "Proxying request"
    );

    match forward(&state, backend, request, client_ip).await {
        Ok(response) => {
            metrics::record_request(method.as_str(), response.status().as_u16(), backend.address(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, backend = %backend, error = %e, "Upstream request failed");
            metrics::record_request(method.as_str(), e.status().as_u16(), backend.address(), start_time);
            e.into_response()
        }
    }
}

async fn forward(
    state: &GatewayState,
    backend: &Backend,
    request: Request<Body>,
    client_ip: Option<IpAddr>,
) -> Result<Response, ProxyError> {
    let (mut parts, body) = request.into_parts();

    // HTTP/2 clients carry the host in the URI authority.
    let inbound_host = parts.headers.get(header::HOST).cloned().or_else(|| {
        parts
            .uri
            .authority()
            .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
    });

    strip_hop_by_hop(&mut parts.headers);
    set_forwarded(&mut parts.headers, client_ip, inbound_host, backend);
    parts.uri = backend.target_uri(&parts.uri)?;
    // Backends are spoken to over HTTP/1.1 regardless of the client's version.
    parts.version = Version::HTTP_11;

    let upstream = Request::from_parts(parts, body);
    let response = time::timeout(state.request_timeout, state.client.request(upstream))
        .await
        .map_err(|_| ProxyError::UpstreamTimeout(state.request_timeout))??;

    Ok(relay(response))
}
