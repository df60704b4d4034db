//! Video Server Player (vsp-server) - Main entry point
//!
//! Serves the current video of a playlist to a remote display client and
//! keeps that client in sync over HTTP, SSE and WebSocket.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vsp_common::config::{LoggingConfig, TomlConfig};
use vsp_server::api;
use vsp_server::config::{ConfigOverrides, ServerConfig};
use vsp_server::media::LocalFs;
use vsp_server::PlaylistController;

/// Command-line arguments for vsp-server
#[derive(Parser, Debug)]
#[command(name = "vsp-server")]
#[command(about = "Playlist controller and streaming endpoint for a video display client")]
#[command(version)]
struct Args {
    /// Path to TOML config file
    #[arg(short, long, env = "VSP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "VSP_PORT")]
    port: Option<u16>,

    /// Address to bind to (overrides config file)
    #[arg(short, long, env = "VSP_BIND")]
    bind: Option<String>,

    /// Service name used as route prefix (overrides config file)
    #[arg(short, long, env = "VSP_SERVICE_NAME")]
    service_name: Option<String>,

    /// Log level (overrides config file)
    #[arg(short, long, env = "VSP_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration file")?;
    let overrides = ConfigOverrides {
        port: args.port,
        bind_addr: args.bind,
        service_name: args.service_name,
        log_level: args.log_level,
    };
    let config = ServerConfig::resolve(overrides, toml).context("Invalid configuration")?;

    init_tracing(&config.logging).context("Failed to initialize logging")?;

    info!(
        "Starting vsp-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Service name: {}", config.service_name);

    let controller = Arc::new(PlaylistController::new(
        config.controller_config(),
        Arc::new(LocalFs::new()),
    ));
    controller.start();

    api::run(&config, Arc::clone(&controller), shutdown_signal())
        .await
        .context("HTTP server failed")?;

    controller.shutdown();
    info!("Server shutdown complete");
    Ok(())
}

/// Install the global subscriber: stderr always, plus a plain-text file when configured
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let level = &logging.level;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "vsp_server={level},vsp_common={level},tower_http={level}"
        ))
    });

    let file_layer = match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Arc::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Global subscriber already set")?;
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
