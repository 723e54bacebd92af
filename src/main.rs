//! Health-aware HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                 LOAD BALANCER                 │
//!                    │                                               │
//!   Client Request   │  ┌──────────┐    ┌──────────┐    ┌─────────┐  │
//!   ─────────────────┼─▶│  http    │───▶│ backend  │───▶│ backend │──┼──▶ Backend
//!                    │  │ gateway  │    │ selector │    │ request │  │    Server
//!                    │  └──────────┘    └────┬─────┘    └─────────┘  │
//!                    │                       │ reads                 │
//!                    │                  ┌────▼─────┐                 │
//!                    │                  │  status  │                 │
//!                    │                  │ registry │                 │
//!                    │                  └────▲─────┘                 │
//!                    │                       │ writes                │
//!                    │                  ┌────┴─────┐                 │
//!                    │                  │  health  │─────────────────┼──▶ GET /health
//!                    │                  │ checker  │                 │
//!                    │                  └──────────┘                 │
//!                    └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use health_balancer::config::load_config;
use health_balancer::lifecycle::signals::wait_for_signal;
use health_balancer::observability::{logging, metrics};
use health_balancer::{LoadBalancer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "health-balancer")]
#[command(about = "Round-robin HTTP load balancer with active health checks", long_about = None)]
struct Cli {
    /// Path to the configuration file (.toml or .json)
    #[arg(short, long)]
    config: PathBuf,

    /// Log level or filter directive, overriding the configuration file
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;

    let level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init_logging(level);

    tracing::info!("health-balancer v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address(),
        protocol = %config.listener.protocol,
        backends = config.initial_addresses.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let balancer = LoadBalancer::new(config)?;
    let listener = balancer.bind().await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_signal().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
        trigger.trigger();
    });

    balancer.serve(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
