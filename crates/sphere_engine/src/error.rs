//! Error types for the estimation engine.
//!
//! Every failure carries the replicate index it belongs to so an operator can
//! tell which slot broke without re-running the experiment.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, EstimationError>;

/// Failure to obtain a deterministic seed state for a sequence index.
#[derive(Debug, Error)]
pub enum SeedError {
    /// No status file exists for the index.
    #[error("status file not found: {}", path.display())]
    Missing {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The status file exists but could not be read or written.
    #[error("status file I/O failed for {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The status file content is not a valid seed state.
    #[error("status file {} is corrupt: {reason}", path.display())]
    Corrupt {
        /// Path of the corrupt file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// The stream position for the index does not fit the persisted format.
    #[error("stream position overflow for seed index {index}")]
    PositionOverflow {
        /// Requested sequence index.
        index: usize,
    },
}

/// Engine error.
#[derive(Debug, Error)]
pub enum EstimationError {
    /// A replicate could not be seeded. Fatal for the run.
    #[error("seed state unavailable for replicate {index}: {source}")]
    SeedUnavailable {
        /// Replicate index.
        index: usize,
        /// Provider failure.
        #[source]
        source: SeedError,
    },

    /// `join` was called on a replicate with no launched run.
    #[error("replicate {index} has no pending run to join")]
    NoPendingRun {
        /// Replicate index.
        index: usize,
    },

    /// A run was requested while another is still in flight.
    #[error("replicate {index} already has a run in flight")]
    RunInFlight {
        /// Replicate index.
        index: usize,
    },

    /// Sampling was requested before any seed state was installed.
    #[error("replicate {index} has not been seeded")]
    Unseeded {
        /// Replicate index.
        index: usize,
    },

    /// The sampling task panicked or was aborted by the runtime.
    #[error("sampling task for replicate {index} failed: {reason}")]
    TaskFailed {
        /// Replicate index.
        index: usize,
        /// Runtime message.
        reason: String,
    },

    /// A verification pass was handed a reference of the wrong length.
    #[error("reference holds {actual} estimates, experiment has {expected} replicates")]
    ReferenceLength {
        /// Replicates in the experiment.
        expected: usize,
        /// Estimates in the reference.
        actual: usize,
    },

    /// Confidence statistics need at least two replicates.
    #[error("insufficient replicates for confidence interval: {0} (need at least 2)")]
    InsufficientReplicates(usize),

    /// Invalid experiment configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_unavailable_display_names_replicate() {
        let err = EstimationError::SeedUnavailable {
            index: 7,
            source: SeedError::Missing {
                path: PathBuf::from("status/status-07.json"),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("replicate 7"));
        assert!(msg.contains("status-07.json"));
    }

    #[test]
    fn test_insufficient_replicates_display() {
        let err = EstimationError::InsufficientReplicates(1);
        assert!(err.to_string().contains("insufficient replicates"));
        assert!(err.to_string().contains("1"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: EstimationError = ConfigError::InvalidReplicateCount(0).into();
        assert!(matches!(err, EstimationError::Config(_)));
    }
}
