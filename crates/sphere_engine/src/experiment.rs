//! Experiment orchestration.
//!
//! An [`Experiment`] owns one [`Replicate`] per sequence index and runs them
//! twice from identical seed states:
//!
//! 1. **Concurrent pass**: seed every replicate, launch one blocking task per
//!    replicate, join in index order and accumulate mean and variance.
//! 2. **Sequential pass**: reseed, run each replicate on the calling thread
//!    and compare its estimate bit for bit with the concurrent one.
//!
//! ```rust
//! use sphere_engine::config::ExperimentConfig;
//! use sphere_engine::experiment::Experiment;
//! use sphere_engine::rng::DerivedSeeds;
//!
//! # #[tokio::main]
//! # async fn main() -> sphere_engine::Result<()> {
//! let config = ExperimentConfig::builder()
//!     .replicates(4)
//!     .points_per_replicate(10_000)
//!     .build()?;
//! let seeds = DerivedSeeds::new(config.draws_per_replicate());
//!
//! let mut experiment = Experiment::new(config, seeds)?;
//! let outcome = experiment.run().await?;
//!
//! assert!(outcome.sequential.all_match());
//! if let Some(summary) = &outcome.summary {
//!     println!("{:.6} ± {:.6}", summary.mean, summary.radius);
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ExperimentConfig;
use crate::error::{EstimationError, Result};
use crate::replicate::Replicate;
use crate::rng::SeedStateProvider;
use crate::sampler::Sample;
use crate::stats::{summarize, ConfidenceReport, Moments};

/// Compares two floats by their underlying bit pattern.
///
/// Unlike `==`, this tells `0.0` from `-0.0` and treats identical NaNs as
/// equal. Reproducibility means the same bits, not values that print alike.
#[inline]
pub fn bit_identical(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits()
}

/// Per-replicate estimates of one concurrent pass and their moments.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExperimentResult {
    estimates: Vec<f64>,
    elapsed: Vec<Duration>,
    wall_time: Duration,
    mean: f64,
    variance: f64,
}

impl ExperimentResult {
    /// Builds a result from samples in replicate-index order.
    pub fn from_samples(samples: &[Sample], wall_time: Duration) -> Self {
        let moments: Moments = samples.iter().map(|s| s.estimate).collect();
        Self {
            estimates: samples.iter().map(|s| s.estimate).collect(),
            elapsed: samples.iter().map(|s| s.elapsed).collect(),
            wall_time,
            mean: moments.mean(),
            variance: moments.variance(),
        }
    }

    /// Estimates indexed by replicate.
    pub fn estimates(&self) -> &[f64] {
        &self.estimates
    }

    /// Sampling time per replicate.
    pub fn elapsed(&self) -> &[Duration] {
        &self.elapsed
    }

    /// Samples in replicate-index order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.estimates
            .iter()
            .zip(&self.elapsed)
            .map(|(&estimate, &elapsed)| Sample { estimate, elapsed })
    }

    /// Wall time from first launch to last join.
    pub fn wall_time(&self) -> Duration {
        self.wall_time
    }

    /// Mean of the estimates.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Biased variance of the estimates.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Number of replicates.
    pub fn len(&self) -> usize {
        self.estimates.len()
    }

    /// Whether the pass holds no replicate.
    pub fn is_empty(&self) -> bool {
        self.estimates.is_empty()
    }

    /// 99 % confidence report for this pass.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientReplicates` with fewer than two replicates.
    pub fn summarize(&self) -> Result<ConfidenceReport> {
        summarize(self.mean, self.variance, self.estimates.len())
    }
}

/// Two estimates for the same replicate that differ in at least one bit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReproducibilityMismatch {
    /// Replicate index.
    pub index: usize,
    /// Estimate from the sequential pass.
    pub sequential: f64,
    /// Estimate from the concurrent pass.
    pub concurrent: f64,
}

impl fmt::Display for ReproducibilityMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reproducibility issue at replicate {}: {:.8} (0x{:016x}) vs {:.8} (0x{:016x})",
            self.index,
            self.sequential,
            self.sequential.to_bits(),
            self.concurrent,
            self.concurrent.to_bits()
        )
    }
}

impl std::error::Error for ReproducibilityMismatch {}

/// Outcome of re-running one replicate sequentially.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReproducibilityCheck {
    /// Replicate index.
    pub index: usize,
    /// Estimate recorded by the concurrent pass.
    pub concurrent: f64,
    /// Estimate produced by the sequential pass.
    pub sequential: f64,
    /// Sampling time of the sequential run.
    pub elapsed: Duration,
}

impl ReproducibilityCheck {
    /// Whether both passes produced the same bits.
    #[inline]
    pub fn is_match(&self) -> bool {
        bit_identical(self.concurrent, self.sequential)
    }

    /// The mismatch, if the bits differ.
    pub fn mismatch(&self) -> Option<ReproducibilityMismatch> {
        (!self.is_match()).then_some(ReproducibilityMismatch {
            index: self.index,
            sequential: self.sequential,
            concurrent: self.concurrent,
        })
    }
}

/// Result of the sequential verification pass.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SequentialPass {
    /// One check per replicate, in index order.
    pub checks: Vec<ReproducibilityCheck>,
    /// Sum of the per-replicate sampling times.
    pub total_elapsed: Duration,
}

impl SequentialPass {
    /// Whether every replicate reproduced exactly.
    pub fn all_match(&self) -> bool {
        self.checks.iter().all(ReproducibilityCheck::is_match)
    }

    /// Replicates whose estimates differ between passes.
    pub fn mismatches(&self) -> impl Iterator<Item = ReproducibilityMismatch> + '_ {
        self.checks.iter().filter_map(ReproducibilityCheck::mismatch)
    }
}

/// Everything one experiment produced.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExperimentOutcome {
    /// Concurrent pass estimates and moments.
    pub concurrent: ExperimentResult,
    /// Confidence report over the concurrent pass, absent with a single
    /// replicate.
    pub summary: Option<ConfidenceReport>,
    /// Sequential verification pass.
    pub sequential: SequentialPass,
}

/// Fixed set of replicates run concurrently, then sequentially.
#[derive(Debug)]
pub struct Experiment<P> {
    config: ExperimentConfig,
    provider: P,
    replicates: Vec<Replicate>,
}

impl<P: SeedStateProvider> Experiment<P> {
    /// Creates an experiment with one unseeded replicate per index.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the configuration is invalid.
    pub fn new(config: ExperimentConfig, provider: P) -> Result<Self> {
        config.validate()?;
        let replicates = (0..config.replicates()).map(Replicate::new).collect();
        Ok(Self {
            config,
            provider,
            replicates,
        })
    }

    /// Experiment configuration.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Replicate slots, in index order.
    pub fn replicates(&self) -> &[Replicate] {
        &self.replicates
    }

    /// Seeds every replicate from the provider, in index order.
    ///
    /// # Errors
    ///
    /// Returns `SeedUnavailable` for the first index the provider cannot
    /// supply.
    pub fn seed_all(&mut self) -> Result<()> {
        for replicate in &mut self.replicates {
            replicate.seed(&self.provider)?;
        }
        debug!(replicates = self.replicates.len(), "seeded all replicates");
        Ok(())
    }

    /// Seeds, launches every replicate as its own task and joins them in
    /// index order.
    ///
    /// Seeding happens before the clock starts.
    ///
    /// # Errors
    ///
    /// Propagates seeding and task failures.
    pub async fn run_concurrent(&mut self) -> Result<ExperimentResult> {
        self.seed_all()?;
        let points = self.config.points_per_replicate();

        info!(
            replicates = self.replicates.len(),
            points, "running concurrent pass"
        );
        let start = Instant::now();
        for replicate in &mut self.replicates {
            replicate.run_async(points)?;
        }

        let mut samples = Vec::with_capacity(self.replicates.len());
        for replicate in &mut self.replicates {
            let sample = replicate.join().await?;
            debug!(
                index = replicate.index(),
                estimate = sample.estimate,
                elapsed_secs = sample.elapsed.as_secs_f64(),
                "replicate joined"
            );
            samples.push(sample);
        }

        Ok(ExperimentResult::from_samples(&samples, start.elapsed()))
    }

    /// Reseeds and re-runs every replicate on the calling thread, comparing
    /// each estimate with `reference` at the same index.
    ///
    /// A mismatch is logged and recorded, never returned as an error.
    ///
    /// # Errors
    ///
    /// - `ReferenceLength` if `reference` does not hold one estimate per
    ///   replicate
    /// - seeding failures
    pub fn run_sequential(&mut self, reference: &ExperimentResult) -> Result<SequentialPass> {
        if reference.len() != self.replicates.len() {
            return Err(EstimationError::ReferenceLength {
                expected: self.replicates.len(),
                actual: reference.len(),
            });
        }

        self.seed_all()?;
        let points = self.config.points_per_replicate();
        info!(replicates = self.replicates.len(), points, "running sequential pass");

        let mut checks = Vec::with_capacity(self.replicates.len());
        let mut total_elapsed = Duration::ZERO;
        for (replicate, &concurrent) in self.replicates.iter_mut().zip(reference.estimates()) {
            let sample = replicate.run_sync(points)?;
            let check = ReproducibilityCheck {
                index: replicate.index(),
                concurrent,
                sequential: sample.estimate,
                elapsed: sample.elapsed,
            };
            if let Some(mismatch) = check.mismatch() {
                warn!(%mismatch, "replicate did not reproduce");
            }
            total_elapsed += sample.elapsed;
            checks.push(check);
        }

        Ok(SequentialPass {
            checks,
            total_elapsed,
        })
    }

    /// Runs the concurrent pass, summarises it, then verifies it
    /// sequentially.
    ///
    /// The sequential pass runs even when the pass cannot be summarised; a
    /// single replicate yields `summary: None`.
    ///
    /// # Errors
    ///
    /// Propagates any seeding or task failure.
    pub async fn run(&mut self) -> Result<ExperimentOutcome> {
        let concurrent = self.run_concurrent().await?;
        let summary = match concurrent.summarize() {
            Ok(report) => Some(report),
            Err(err @ EstimationError::InsufficientReplicates(_)) => {
                warn!(%err, "skipping confidence report");
                None
            }
            Err(err) => return Err(err),
        };
        let sequential = self.run_sequential(&concurrent)?;

        Ok(ExperimentOutcome {
            concurrent,
            summary,
            sequential,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeedError;
    use crate::rng::{DerivedSeeds, SeedState};

    fn small_config(replicates: usize) -> ExperimentConfig {
        ExperimentConfig::builder()
            .replicates(replicates)
            .points_per_replicate(2_000)
            .build()
            .unwrap()
    }

    /// Supplies states for the first `limit` indices only.
    struct Truncated {
        inner: DerivedSeeds,
        limit: usize,
    }

    impl SeedStateProvider for Truncated {
        fn seed_state(&self, index: usize) -> std::result::Result<SeedState, SeedError> {
            if index >= self.limit {
                return Err(SeedError::Missing {
                    path: format!("status-{index:02}.json").into(),
                });
            }
            self.inner.seed_state(index)
        }
    }

    #[test]
    fn test_bit_identical_distinguishes_signed_zero() {
        assert!(bit_identical(1.5, 1.5));
        assert!(!bit_identical(0.0, -0.0));
        assert!(bit_identical(f64::NAN, f64::NAN));
    }

    #[test]
    fn test_result_moments_in_index_order() {
        let samples = [
            Sample {
                estimate: 4.0,
                elapsed: Duration::from_millis(1),
            },
            Sample {
                estimate: 4.4,
                elapsed: Duration::from_millis(2),
            },
        ];
        let result = ExperimentResult::from_samples(&samples, Duration::from_millis(3));
        assert_eq!(result.estimates(), &[4.0, 4.4]);
        assert_eq!(result.elapsed()[1], Duration::from_millis(2));
        assert!((result.mean() - 4.2).abs() < 1e-12);
        assert!((result.variance() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_mismatch_display_shows_bits() {
        let check = ReproducibilityCheck {
            index: 3,
            concurrent: 1.0,
            sequential: 1.0 + f64::EPSILON,
            elapsed: Duration::ZERO,
        };
        let mismatch = check.mismatch().unwrap();
        let text = mismatch.to_string();
        assert!(text.contains("replicate 3"));
        assert!(text.contains("0x3ff0000000000001"));
        assert!(text.contains("0x3ff0000000000000"));
    }

    #[tokio::test]
    async fn test_passes_agree() {
        let config = small_config(4);
        let seeds = DerivedSeeds::new(config.draws_per_replicate());
        let mut experiment = Experiment::new(config, seeds).unwrap();

        let outcome = experiment.run().await.unwrap();

        assert_eq!(outcome.concurrent.len(), 4);
        assert_eq!(outcome.sequential.checks.len(), 4);
        assert!(outcome.sequential.all_match());
        assert_eq!(outcome.sequential.mismatches().count(), 0);
        assert_eq!(outcome.summary.map(|s| s.replicates), Some(4));
    }

    #[tokio::test]
    async fn test_distinct_replicates_differ() {
        let config = small_config(3);
        let seeds = DerivedSeeds::new(config.draws_per_replicate());
        let mut experiment = Experiment::new(config, seeds).unwrap();

        let result = experiment.run_concurrent().await.unwrap();
        let estimates = result.estimates();
        assert!(estimates.windows(2).any(|w| !bit_identical(w[0], w[1])));
    }

    #[tokio::test]
    async fn test_missing_seed_aborts() {
        let config = small_config(3);
        let provider = Truncated {
            inner: DerivedSeeds::new(config.draws_per_replicate()),
            limit: 2,
        };
        let mut experiment = Experiment::new(config, provider).unwrap();

        let err = experiment.run().await.unwrap_err();
        assert!(matches!(err, EstimationError::SeedUnavailable { index: 2, .. }));
    }

    #[tokio::test]
    async fn test_single_replicate_still_verified() {
        let config = small_config(1);
        let seeds = DerivedSeeds::new(config.draws_per_replicate());
        let mut experiment = Experiment::new(config, seeds).unwrap();

        let outcome = experiment.run().await.unwrap();

        assert!(outcome.summary.is_none());
        assert!(matches!(
            outcome.concurrent.summarize(),
            Err(EstimationError::InsufficientReplicates(1))
        ));
        assert_eq!(outcome.sequential.checks.len(), 1);
        assert!(outcome.sequential.all_match());
    }

    #[test]
    fn test_reference_length_checked() {
        let config = small_config(2);
        let seeds = DerivedSeeds::new(config.draws_per_replicate());
        let mut experiment = Experiment::new(config, seeds).unwrap();

        let reference = ExperimentResult::from_samples(&[], Duration::ZERO);
        assert!(matches!(
            experiment.run_sequential(&reference),
            Err(EstimationError::ReferenceLength { expected: 2, actual: 0 })
        ));
    }

    #[test]
    fn test_sequential_detects_drift() {
        let config = small_config(2);
        let seeds = DerivedSeeds::new(config.draws_per_replicate());
        let mut experiment = Experiment::new(config, seeds).unwrap();

        let forged = ExperimentResult::from_samples(
            &[
                Sample {
                    estimate: 1.0,
                    elapsed: Duration::ZERO,
                },
                Sample {
                    estimate: 2.0,
                    elapsed: Duration::ZERO,
                },
            ],
            Duration::ZERO,
        );
        let pass = experiment.run_sequential(&forged).unwrap();
        assert!(!pass.all_match());
        assert_eq!(pass.mismatches().count(), 2);
        assert_eq!(
            pass.total_elapsed,
            pass.checks.iter().map(|c| c.elapsed).sum::<Duration>()
        );
    }
}
