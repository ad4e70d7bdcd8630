#![deny(unsafe_code)]

//! seedbox CLI: control a Transmission daemon from the shell.

mod commands;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use seedbox_config::AppConfig;
use seedbox_rpc::{CallContext, Client, ClientParams};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::Command;

/// Manage torrents on a Transmission daemon.
#[derive(Parser)]
#[command(name = "seedbox", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "seedbox.toml")]
    config: PathBuf,

    /// Daemon URL, overriding `daemon.host`.
    #[arg(long)]
    host: Option<String>,

    /// Give up on the daemon after this many seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = load_config(&cli.config).await?;
    config.apply_env().context("invalid environment override")?;
    if let Some(host) = &cli.host {
        config.daemon.host = host.clone();
    }

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Command::Config { show } => cmd_config(&config, &cli.config, *show, &mut stdout)?,
        Command::Fields => commands::write_fields(&mut stdout)?,
        command => {
            config.validate().context("invalid configuration")?;
            let client = Client::new(ClientParams::from(&config.daemon)).context("failed to build daemon client")?;
            let ctx = CallContext::with_timeout(Duration::from_secs(cli.timeout));
            commands::run(command, &client, &ctx, &mut stdout).await?;
        }
    }

    Ok(())
}

fn cmd_config(config: &AppConfig, path: &Path, show: bool, out: &mut impl std::io::Write) -> Result<()> {
    config.validate().context("invalid configuration")?;
    if show {
        let toml_str = toml::to_string_pretty(&config.redacted()).context("failed to render configuration")?;
        writeln!(out, "{toml_str}")?;
    } else {
        writeln!(out, "Configuration at '{}' is valid.", path.display())?;
    }
    Ok(())
}

async fn load_config(path: &Path) -> Result<AppConfig> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        AppConfig::load(path)
            .await
            .with_context(|| format!("failed to load {}", path.display()))
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        Ok(AppConfig::default())
    }
}
