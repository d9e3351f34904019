//! reqlog: HTTP server with live request/response logging.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                      REQLOG                       │
//!  Client Request    │  ┌──────────┐   ┌────────────┐   ┌────────────┐  │
//!  ──────────────────┼─▶│request id│──▶│  exchange  │──▶│ echo / fwd │──┼──▶ Upstream
//!                    │  │  layer   │   │   logger   │   │  handler   │  │    (optional,
//!  Client Response   │  └──────────┘   └─────┬──────┘   └─────┬──────┘  │    round-trip
//!  ◀─────────────────┼───────────────────────┘                │         │    logged)
//!                    │                       │ render         │ render  │
//!                    │                       ▼                ▼         │
//!                    │                  ┌──────────────────────────┐    │
//!                    │                  │  output sink (stdout…)   │    │
//!                    │                  └──────────────────────────┘    │
//!                    │  /logging  GET / · PUT /set  → live detail level  │
//!                    └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use reqlog::config::{load_config, watcher::ConfigWatcher, ReqlogConfig};
use reqlog::http::server::build_logger;
use reqlog::lifecycle::{signals::shutdown_signal, Shutdown};
use reqlog::observability::logging;
use reqlog::HttpServer;

#[derive(Parser)]
#[command(name = "reqlog")]
#[command(about = "HTTP server with live request/response logging", long_about = None)]
struct Cli {
    /// TOML configuration file. Watched for detail-level changes.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ReqlogConfig::default(),
    };

    logging::init(&config.observability.log_filter);
    tracing::info!("reqlog v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        level = %config.logging.detail_level(),
        output = %config.logging.output,
        upstream = ?config.upstream.url,
        "Configuration loaded"
    );

    let logger = build_logger(&config.logging)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.logging.detail_level());
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, logger);
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
