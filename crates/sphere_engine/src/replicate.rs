//! Replicate runner.
//!
//! A [`Replicate`] owns one private generator and one output slot. An
//! asynchronous run moves the generator into a blocking task and gets it back
//! on [`Replicate::join`], so no replicate ever shares mutable state with
//! another.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{EstimationError, Result};
use crate::rng::{ReplicateRng, SeedStateProvider};
use crate::sampler::{estimate_sphere_volume, Sample};

/// One independent replicate slot.
#[derive(Debug)]
pub struct Replicate {
    index: usize,
    rng: Option<ReplicateRng>,
    pending: Option<JoinHandle<(ReplicateRng, Sample)>>,
    outcome: Option<Sample>,
}

impl Replicate {
    /// Creates an unseeded replicate for sequence index `index`.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            rng: None,
            pending: None,
            outcome: None,
        }
    }

    /// Sequence index of this replicate.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Installs the state `provider` holds for this replicate's index,
    /// replacing any earlier generator.
    ///
    /// # Errors
    ///
    /// - `SeedUnavailable` if the provider cannot supply the state
    /// - `RunInFlight` if an asynchronous run has not been joined yet
    pub fn seed<P: SeedStateProvider + ?Sized>(&mut self, provider: &P) -> Result<()> {
        if self.pending.is_some() {
            return Err(EstimationError::RunInFlight { index: self.index });
        }
        let state = provider
            .seed_state(self.index)
            .map_err(|source| EstimationError::SeedUnavailable {
                index: self.index,
                source,
            })?;
        debug!(index = self.index, word_pos = state.word_pos(), "seeded replicate");
        self.rng = Some(ReplicateRng::from_state(&state));
        Ok(())
    }

    /// Launches sampling on the runtime's blocking pool without waiting.
    ///
    /// Must be called from within a tokio runtime. The replicate stays
    /// pending until [`join`](Self::join) is awaited.
    ///
    /// # Errors
    ///
    /// - `RunInFlight` if a previous run is still pending
    /// - `Unseeded` if no generator was ever installed
    pub fn run_async(&mut self, point_count: u64) -> Result<()> {
        if self.pending.is_some() {
            return Err(EstimationError::RunInFlight { index: self.index });
        }
        let mut rng = self
            .rng
            .take()
            .ok_or(EstimationError::Unseeded { index: self.index })?;

        self.outcome = None;
        self.pending = Some(tokio::task::spawn_blocking(move || {
            let sample = estimate_sphere_volume(&mut rng, point_count);
            (rng, sample)
        }));
        Ok(())
    }

    /// Samples on the calling thread and returns once complete.
    ///
    /// # Errors
    ///
    /// - `RunInFlight` if an asynchronous run is still pending
    /// - `Unseeded` if no generator was ever installed
    pub fn run_sync(&mut self, point_count: u64) -> Result<Sample> {
        if self.pending.is_some() {
            return Err(EstimationError::RunInFlight { index: self.index });
        }
        let rng = self
            .rng
            .as_mut()
            .ok_or(EstimationError::Unseeded { index: self.index })?;

        let sample = estimate_sphere_volume(rng, point_count);
        self.outcome = Some(sample);
        Ok(sample)
    }

    /// Waits for the pending asynchronous run and exposes its sample.
    ///
    /// # Errors
    ///
    /// - `NoPendingRun` if nothing was launched
    /// - `TaskFailed` if the sampling task panicked
    pub async fn join(&mut self) -> Result<Sample> {
        let handle = self
            .pending
            .take()
            .ok_or(EstimationError::NoPendingRun { index: self.index })?;

        let (rng, sample) = handle.await.map_err(|e| EstimationError::TaskFailed {
            index: self.index,
            reason: e.to_string(),
        })?;

        self.rng = Some(rng);
        self.outcome = Some(sample);
        Ok(sample)
    }

    /// Whether an asynchronous run awaits joining.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Last completed sample, if any.
    #[inline]
    pub fn outcome(&self) -> Option<Sample> {
        self.outcome
    }

    /// Last completed estimate, if any.
    #[inline]
    pub fn estimate(&self) -> Option<f64> {
        self.outcome.map(|s| s.estimate)
    }

    /// Wall time of the last completed run, if any.
    #[inline]
    pub fn elapsed(&self) -> Option<Duration> {
        self.outcome.map(|s| s.elapsed)
    }
}
