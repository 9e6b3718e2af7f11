//! # Sphere Engine
//!
//! Estimates the volume of the unit sphere (4π/3) by Monte Carlo sampling,
//! replicated over independent random streams, and checks that every
//! replicate reproduces bit for bit whether it runs concurrently or
//! sequentially.
//!
//! ## Layers
//!
//! ```text
//! Experiment                (orchestration, two passes)
//! ├── ExperimentConfig      (replicates, points per replicate)
//! ├── SeedStateProvider     (deterministic state per sequence index)
//! ├── Replicate × R         (private ReplicateRng, sync/async runs)
//! │   └── estimate_sphere_volume()
//! └── stats::summarize()    (Student's t confidence report)
//! ```
//!
//! ## Usage Example
//!
//! ```rust
//! use sphere_engine::{DerivedSeeds, Experiment, ExperimentConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> sphere_engine::Result<()> {
//! let config = ExperimentConfig::builder()
//!     .replicates(5)
//!     .points_per_replicate(20_000)
//!     .build()?;
//! let seeds = DerivedSeeds::new(config.draws_per_replicate());
//!
//! let outcome = Experiment::new(config, seeds)?.run().await?;
//! if let Some(summary) = &outcome.summary {
//!     println!("{summary}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod error;
pub mod experiment;
pub mod replicate;
pub mod report;
pub mod rng;
pub mod sampler;
pub mod stats;

// Re-export commonly used items for convenience
pub use config::{ConfigError, ExperimentConfig, DIMENSION};
pub use error::{EstimationError, Result, SeedError};
pub use experiment::{
    bit_identical, Experiment, ExperimentOutcome, ExperimentResult, ReproducibilityCheck,
    ReproducibilityMismatch, SequentialPass,
};
pub use replicate::Replicate;
pub use rng::{DerivedSeeds, ReplicateRng, SeedState, SeedStateProvider, StatusDirectory};
pub use sampler::{estimate_sphere_volume, Sample};
pub use stats::{summarize, ConfidenceReport, SPHERE_VOLUME};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
