//! CLI error types

use thiserror::Error;

use crate::config::ConfigError;

/// Result alias for CLI commands
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Estimation failed: {0}")]
    Estimation(#[from] sphere_engine::EstimationError),

    #[error("Status generation failed: {0}")]
    Seed(#[from] sphere_engine::SeedError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
