//! hop-relay
//!
//! Synthetic load generator for multi-hop service topologies.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /?hops=2            GET /?hops=1            GET /?hops=0
//!  ─────────────▶ relay A ─────────────▶ relay B ─────────────▶ relay A
//!                  │   ▲                  │   ▲                  │
//!                  │   └──── "Done" ──────┘   └──── "Done" ──────┘
//!                  ▼
//!               "Done"
//! ```
//!
//! Every instance runs the same pipeline:
//! request identity → access log → hop engine.

use clap::Parser;
use tokio::net::TcpListener;

use hop_relay::config::{resolve_config, ConfigOverrides};
use hop_relay::lifecycle::{signals, Shutdown};
use hop_relay::observability::{logging, metrics};
use hop_relay::HopServer;

#[derive(Parser)]
#[command(name = "hop-relay")]
#[command(about = "Forwards requests across a pool of peers until the hop count runs out", long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli.overrides)?;

    logging::init(&config.observability.log_level);

    tracing::info!(
        port = config.listener.port,
        hosts = ?config.hops.hosts,
        work_load_ms = config.hops.work_load_ms,
        work_load_mode = ?config.hops.work_load_mode,
        forward_timeout_ms = config.hops.forward_timeout_ms,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        metrics::init_metrics(addr.parse()?)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    HopServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
