//! Application configuration management
//!
//! Layers, lowest to highest priority: defaults, TOML file, `SPHERE_*`
//! environment variables, command line flags.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

use sphere_engine::config::{DEFAULT_POINTS_PER_REPLICATE, DEFAULT_REPLICATES};
use sphere_engine::ExperimentConfig;

/// Status directory used by `genstatus` when none is configured
pub const DEFAULT_STATUS_DIR: &str = "status";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid output format: {0}. Must be one of: table, json")]
    InvalidFormat(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Configuration file error: {0}")]
    FileError(String),

    #[error(transparent)]
    Experiment(#[from] sphere_engine::ConfigError),
}

/// Parse a log level name (`trace`, `debug`, `info`, `warn`, `error`)
pub fn parse_log_level(s: &str) -> Result<Level, ConfigError> {
    Level::from_str(s).map_err(|_| ConfigError::InvalidLogLevel(s.to_string()))
}

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ConfigError::InvalidFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Application configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Number of independent replicates
    pub replicates: usize,
    /// Sampling budget per replicate
    pub points_per_replicate: u64,
    /// Directory of status files; seeds are derived in memory when unset
    pub status_dir: Option<PathBuf>,
    /// Log level
    #[serde(deserialize_with = "deserialize_from_str")]
    pub log_level: Level,
    /// Report output format
    #[serde(deserialize_with = "deserialize_from_str")]
    pub format: OutputFormat,
}

fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let s = String::deserialize(deserializer)?;
    T::from_str(&s).map_err(serde::de::Error::custom)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            replicates: DEFAULT_REPLICATES,
            points_per_replicate: DEFAULT_POINTS_PER_REPLICATE,
            status_dir: None,
            log_level: Level::INFO,
            format: OutputFormat::Table,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `SPHERE_*` environment variables on top of the current values
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(|name| std::env::var(name).ok())
    }

    pub(crate) fn merge_with_vars<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = var("SPHERE_REPLICATES") {
            self.replicates = value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "SPHERE_REPLICATES",
                value,
            })?;
        }
        if let Some(value) = var("SPHERE_POINTS") {
            self.points_per_replicate = value.parse().map_err(|_| ConfigError::InvalidValue {
                name: "SPHERE_POINTS",
                value,
            })?;
        }
        if let Some(value) = var("SPHERE_STATUS_DIR") {
            self.status_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = var("SPHERE_LOG_LEVEL") {
            self.log_level = parse_log_level(&value)?;
        }
        if let Some(value) = var("SPHERE_FORMAT") {
            self.format = OutputFormat::from_str(&value)?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) -> Result<(), ConfigError> {
        if let Some(replicates) = cli.replicates {
            self.replicates = replicates;
        }
        if let Some(points) = cli.points_per_replicate {
            self.points_per_replicate = points;
        }
        if let Some(dir) = &cli.status_dir {
            self.status_dir = Some(dir.clone());
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = parse_log_level(log_level)?;
        }
        if let Some(format) = &cli.format {
            self.format = OutputFormat::from_str(format)?;
        }
        Ok(())
    }

    /// Configured status directory, or [`DEFAULT_STATUS_DIR`]
    pub fn status_dir_or_default(&self) -> &Path {
        self.status_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_STATUS_DIR))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.experiment().map(|_| ())
    }

    /// Engine configuration for these settings
    pub fn experiment(&self) -> Result<ExperimentConfig, ConfigError> {
        Ok(ExperimentConfig::builder()
            .replicates(self.replicates)
            .points_per_replicate(self.points_per_replicate)
            .build()?)
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Replicate count override
    pub replicates: Option<usize>,
    /// Point budget override
    pub points_per_replicate: Option<u64>,
    /// Status directory override
    pub status_dir: Option<PathBuf>,
    /// Log level override
    pub log_level: Option<String>,
    /// Output format override
    pub format: Option<String>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config_file {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };

    config.merge_with_env()?;
    config.merge_with_cli(cli)?;

    config.validate()?;
    Ok(config)
}
