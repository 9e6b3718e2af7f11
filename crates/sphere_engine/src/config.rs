//! Experiment configuration.
//!
//! The replicate count and per-replicate point budget are carried in an
//! immutable [`ExperimentConfig`] handed to the orchestrator at construction,
//! so tests can run tiny experiments without touching any global constant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of coordinates drawn per sample point.
pub const DIMENSION: usize = 3;

/// Default number of independent replicates.
pub const DEFAULT_REPLICATES: usize = 10;

/// Default sampling budget per replicate.
pub const DEFAULT_POINTS_PER_REPLICATE: u64 = 1_000_000_000;

/// Maximum number of replicates allowed (one task each).
pub const MAX_REPLICATES: usize = 10_000;

/// Configuration error for an experiment.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Replicate count outside valid range [1, 10_000].
    #[error("Invalid replicate count {0}: must be in range [1, 10_000]")]
    InvalidReplicateCount(usize),

    /// Points per replicate would overflow the draw counter.
    #[error("Invalid point budget {0}: {DIMENSION} draws per point must fit in 64 bits")]
    InvalidPointBudget(u64),
}

/// Immutable experiment configuration.
///
/// Use [`ExperimentConfig::builder`] to construct instances; the builder
/// validates at build time.
///
/// # Examples
///
/// ```rust
/// use sphere_engine::config::ExperimentConfig;
///
/// let config = ExperimentConfig::builder()
///     .replicates(4)
///     .points_per_replicate(10_000)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.replicates(), 4);
/// assert_eq!(config.draws_per_replicate(), 30_000);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Number of independent replicates.
    replicates: usize,
    /// Sampling budget per replicate.
    points_per_replicate: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            replicates: DEFAULT_REPLICATES,
            points_per_replicate: DEFAULT_POINTS_PER_REPLICATE,
        }
    }
}

impl ExperimentConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> ExperimentConfigBuilder {
        ExperimentConfigBuilder::default()
    }

    /// Returns the number of replicates.
    #[inline]
    pub fn replicates(&self) -> usize {
        self.replicates
    }

    /// Returns the sampling budget per replicate.
    #[inline]
    pub fn points_per_replicate(&self) -> u64 {
        self.points_per_replicate
    }

    /// Returns the sample dimension (always 3).
    #[inline]
    pub fn dimension(&self) -> usize {
        DIMENSION
    }

    /// Returns the number of uniform draws one replicate consumes.
    #[inline]
    pub fn draws_per_replicate(&self) -> u64 {
        self.points_per_replicate * DIMENSION as u64
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `replicates` is 0 or greater than 10,000
    /// - `points_per_replicate × 3` overflows `u64`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replicates == 0 || self.replicates > MAX_REPLICATES {
            return Err(ConfigError::InvalidReplicateCount(self.replicates));
        }
        if self
            .points_per_replicate
            .checked_mul(DIMENSION as u64)
            .is_none()
        {
            return Err(ConfigError::InvalidPointBudget(self.points_per_replicate));
        }
        Ok(())
    }
}

/// Builder for [`ExperimentConfig`].
///
/// Unset fields fall back to the defaults (10 replicates, 10⁹ points).
#[derive(Clone, Debug, Default)]
pub struct ExperimentConfigBuilder {
    replicates: Option<usize>,
    points_per_replicate: Option<u64>,
}

impl ExperimentConfigBuilder {
    /// Sets the number of replicates.
    ///
    /// # Arguments
    ///
    /// * `replicates` - Replicate count in [1, 10_000]
    #[inline]
    pub fn replicates(mut self, replicates: usize) -> Self {
        self.replicates = Some(replicates);
        self
    }

    /// Sets the sampling budget per replicate.
    #[inline]
    pub fn points_per_replicate(mut self, points: u64) -> Self {
        self.points_per_replicate = Some(points);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build(self) -> Result<ExperimentConfig, ConfigError> {
        let config = ExperimentConfig {
            replicates: self.replicates.unwrap_or(DEFAULT_REPLICATES),
            points_per_replicate: self
                .points_per_replicate
                .unwrap_or(DEFAULT_POINTS_PER_REPLICATE),
        };
        config.validate()?;
        Ok(config)
    }
}
