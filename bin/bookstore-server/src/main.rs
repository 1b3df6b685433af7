//! Bookstore Server - catalog REST service
//!
//! This binary serves the book catalog over HTTP, persisting it to a
//! single JSON document.

use anyhow::Result;
use bookstore_common::{LatencyConfig, ServerConfig};
use bookstore_store::BookStore;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "bookstore-server")]
#[command(about = "Bookstore catalog REST service")]
#[command(version)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "BOOKSTORE_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address, overrides the configuration
    #[arg(short, long)]
    listen: Option<String>,

    /// Book document path, overrides the configuration
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Disable the simulated processing latency
    #[arg(long, default_value_t = false)]
    no_latency: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(data_file) = args.data_file {
        config.data_file = data_file;
    }
    if args.no_latency {
        config.latency = LatencyConfig::NONE;
    }

    info!("Starting Bookstore Server");
    info!("Book document: {}", config.data_file.display());
    info!(
        "Simulated latency: read={}ms write={}ms search={}ms",
        config.latency.read_ms, config.latency.write_ms, config.latency.search_ms
    );

    // A corrupt document is fatal; never continue with an empty catalog
    let store = BookStore::open(&config.data_file).map_err(|e| {
        anyhow::anyhow!(
            "Failed to open book document {}: {}",
            config.data_file.display(),
            e
        )
    })?;

    let app = bookstore_api::router(store, config.latency).layer(TraceLayer::new_for_http());

    // Parse listen address
    let addr: SocketAddr = config
        .listen
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", config.listen, e))?;

    info!("Bookstore API running on http://{}", addr);

    // Start server
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down...");
        })
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}
