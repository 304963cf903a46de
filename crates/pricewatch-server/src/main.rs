//! pricewatch server - HTTP API for tracked queries and their items.

use anyhow::{Context, Result};
use clap::Parser;
use pricewatch_server::{config::Config, logging, routes, state::AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use logging::{LogConfig, LogFormat, LogPreset};

/// pricewatch server - tracked search queries and the items found for them.
#[derive(Parser, Debug)]
#[command(name = "pricewatch-server")]
#[command(about = "HTTP API for tracked queries and items")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override port from config
    #[arg(short, long)]
    port: Option<u16>,

    /// Override database path from config
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,

    /// Enable verbose logging (INFO level, request traces)
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace logging (TRACE level for everything)
    #[arg(long)]
    trace: bool,

    /// Quiet mode (WARN and ERROR only)
    #[arg(short, long)]
    quiet: bool,

    /// Set log level for specific targets (e.g., "store=debug").
    /// Can be specified multiple times. Targets are prefixed with "pricewatch::" automatically.
    #[arg(long = "log", value_name = "TARGET=LEVEL")]
    log_overrides: Vec<String>,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let preset = LogPreset::from_flags(cli.verbose, cli.debug, cli.trace, cli.quiet);
    logging::init(&LogConfig::new(preset, &cli.log_overrides, cli.log_format));

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };

    // Apply CLI overrides
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    tracing::info!(
        target: "pricewatch::startup",
        "Loaded configuration (port: {}, db: {})",
        config.port,
        config.db_path.display()
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = Arc::new(AppState::new(config).context("failed to open catalog store")?);
    tracing::info!(target: "pricewatch::startup", "Opened catalog store");

    let app = routes::router(state);

    tracing::info!(target: "pricewatch::startup", "Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(target: "pricewatch::startup", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(
            target: "pricewatch::startup",
            "Failed to listen for shutdown signal: {}",
            e
        );
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "pricewatch::startup", "Shutdown signal received");
}
