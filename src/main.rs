//! sweeparr - main entry point
//!
//! Loads configuration, runs one sweep over the movie library, and
//! exits. Scheduling recurring sweeps is left to cron or a systemd
//! timer.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sweeparr::config::Config;

/// Command-line arguments for sweeparr
#[derive(Parser, Debug)]
#[command(name = "sweeparr")]
#[command(about = "Clean up movies based on watch history and ratings")]
#[command(version)]
struct Args {
    /// Evaluate the library without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "sweeparr.toml", env = "SWEEPARR_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sweeparr=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    info!("Starting sweeparr");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    sweeparr::sweep::run_sweep(&config, args.dry_run)
        .await
        .context("Sweep failed")?;

    info!("Cleanup complete");

    Ok(())
}
