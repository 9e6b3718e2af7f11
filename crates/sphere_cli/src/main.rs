//! Sphere-π CLI - Replicated Monte Carlo Estimation
//!
//! Operational entry point for the sphere-volume estimator.
//!
//! # Commands
//!
//! - `sphere-pi run` - Run all replicates concurrently, summarise, then verify
//!   them sequentially
//! - `sphere-pi genstatus --status-dir <dir>` - Write one seed state per
//!   replicate
//!
//! # Configuration
//!
//! Defaults, then `--config <file>` (TOML), then `SPHERE_*` environment
//! variables, then command line flags.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

pub use error::{CliError, Result};

use config::{build_config, CliArgs};

/// Sphere-volume π estimator with reproducibility verification
#[derive(Parser)]
#[command(name = "sphere-pi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the concurrent and sequential passes
    Run {
        /// Number of independent replicates
        #[arg(short, long)]
        replicates: Option<usize>,

        /// Points sampled per replicate
        #[arg(short, long)]
        points: Option<u64>,

        /// Directory of status files (derived in memory when omitted)
        #[arg(short, long)]
        status_dir: Option<PathBuf>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Generate one seed state per replicate
    Genstatus {
        /// Number of replicates to generate states for
        #[arg(short, long)]
        replicates: Option<usize>,

        /// Points each replicate will sample; sets the stream spacing
        #[arg(short, long)]
        points: Option<u64>,

        /// Output directory (defaults to the configured one, then `status`)
        #[arg(short, long)]
        status_dir: Option<PathBuf>,
    },
}

impl Cli {
    fn config_args(&self) -> CliArgs {
        let log_level = match (&self.log_level, self.verbose) {
            (Some(level), _) => Some(level.clone()),
            (None, true) => Some("debug".to_string()),
            (None, false) => None,
        };
        let mut args = CliArgs {
            config_file: self.config.clone(),
            log_level,
            ..Default::default()
        };
        match &self.command {
            Commands::Run {
                replicates,
                points,
                status_dir,
                format,
            } => {
                args.replicates = *replicates;
                args.points_per_replicate = *points;
                args.status_dir = status_dir.clone();
                args.format = format.clone();
            }
            Commands::Genstatus {
                replicates,
                points,
                status_dir,
            } => {
                args.replicates = *replicates;
                args.points_per_replicate = *points;
                args.status_dir = status_dir.clone();
            }
        }
        args
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli.config_args()).context("failed to load configuration")?;

    init_tracing(config.log_level.as_str());
    info!(
        version = sphere_engine::VERSION,
        log_level = %config.log_level,
        replicates = config.replicates,
        points_per_replicate = config.points_per_replicate,
        format = %config.format,
        "configuration loaded"
    );

    match &cli.command {
        Commands::Run { .. } => commands::run::run(&config)
            .await
            .context("experiment failed")?,
        Commands::Genstatus { .. } => {
            commands::genstatus::run(&config).context("status generation failed")?
        }
    }
    Ok(())
}
