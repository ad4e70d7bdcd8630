#![deny(unsafe_code)]

//! `seedbox-exporter`: serve Transmission daemon metrics for Prometheus.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use seedbox_config::{AppConfig, LoggingConfig};
use seedbox_exporter::{Exporter, server};
use seedbox_rpc::{Client, ClientParams};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Longest wait for in-flight scrapes after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Prometheus exporter for a Transmission daemon.
#[derive(Parser)]
#[command(name = "seedbox-exporter", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file. Missing files fall back to defaults.
    #[arg(short, long, default_value = "seedbox.toml")]
    config: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv). Overrides `logging.level`.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Export per-torrent metrics regardless of configuration.
    #[arg(long)]
    torrent_metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, found) = load_config(&cli.config).await?;
    config
        .apply_env()
        .context("invalid environment override")?;
    if cli.torrent_metrics {
        config.exporter.torrent_metrics = true;
    }
    config.validate().context("invalid configuration")?;

    init_tracing(&config.logging, cli.verbose);
    if !found {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }
    if config.exporter.torrent_metrics {
        info!("exporting torrent-level metrics");
    }

    let client = Client::new(ClientParams::from(&config.daemon)).context("failed to build daemon client")?;
    info!(endpoint = %client.transport().endpoint(), "daemon client ready");

    let exporter = Arc::new(Exporter::from_config(Arc::new(client), &config.exporter));
    let listener = server::bind(&config.exporter.bind_addr()).await?;

    let shutdown = CancellationToken::new();
    let mut server_task = tokio::spawn(server::serve(listener, exporter, shutdown.clone()));

    tokio::select! {
        result = &mut server_task => {
            result.context("metrics server task panicked")??;
            return Ok(());
        }
        _ = shutdown_signal() => {
            warn!(timeout_secs = DRAIN_TIMEOUT.as_secs(), "shutdown signal received, draining");
            shutdown.cancel();
        }
    }

    match tokio::time::timeout(DRAIN_TIMEOUT, server_task).await {
        Ok(joined) => {
            joined.context("metrics server task panicked")??;
            info!("metrics server stopped");
        }
        Err(_) => error!("metrics server did not drain in time, exiting"),
    }
    Ok(())
}

async fn load_config(path: &Path) -> Result<(AppConfig, bool)> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        let config = AppConfig::load(path)
            .await
            .with_context(|| format!("failed to load {}", path.display()))?;
        Ok((config, true))
    } else {
        Ok((AppConfig::default(), false))
    }
}

fn init_tracing(logging: &LoggingConfig, verbose: u8) {
    let level = match verbose {
        0 => logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
