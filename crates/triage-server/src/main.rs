//! Triage Server
//!
//! HTTP front end for the clinic's rule-based triage assistant.
//!
//! Accepts patient chat messages, answers them through the triage
//! classifier, and keeps per-session history, transcripts and metrics.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

mod config;
mod routes;
mod state;
mod validation;

use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "triage-server")]
#[command(about = "Rule-based symptom triage assistant", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TRIAGE_CONFIG", default_value = "triage.yaml")]
    config: String,

    /// Rule tables file overriding the built-in rules
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Maximum number of live sessions
    #[arg(long)]
    max_sessions: Option<usize>,

    /// Disable transcript persistence
    #[arg(long)]
    no_transcript: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json_logs);

    info!("Starting Triage Server");

    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    if let Some(limit) = config.max_sessions {
        info!("Max sessions: {}", limit);
    }

    let metrics_handle = init_metrics()?;

    let state = state::AppState::new(config, Some(metrics_handle))?;
    info!("Application state initialized successfully");

    let addr = state.config.socket_addr()?;
    let app = routes::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Triage server listening on http://{}", addr);

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    state.flush_transcripts();
    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("triage=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("triage=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    triage_telemetry::describe_metrics();

    info!("Metrics exporter initialized");
    Ok(handle)
}
