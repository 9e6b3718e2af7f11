//! Replicate random number generator.
//!
//! This module provides [`ReplicateRng`], a ChaCha12 stream whose complete
//! state can be captured into and restored from a [`SeedState`], and the
//! [`UniformSource`] abstraction the sampler draws from.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

use super::state::SeedState;

/// Number of 32-bit stream words consumed by one `f64` draw.
pub const WORDS_PER_DRAW: u128 = 2;

/// A source of uniform floats in [0, 1).
///
/// The sampler is generic over this trait so a scripted source can stand in
/// for the real generator in tests.
pub trait UniformSource {
    /// Draws the next uniform value in [0, 1).
    fn next_uniform(&mut self) -> f64;
}

/// Replicate random number generator.
///
/// Each replicate owns one instance exclusively. Two instances restored from
/// the same [`SeedState`] produce bit-identical sequences.
///
/// # Examples
///
/// ```rust
/// use sphere_engine::rng::{ReplicateRng, SeedState};
///
/// let state = SeedState::from_master(42, 0).unwrap();
/// let mut a = ReplicateRng::from_state(&state);
/// let mut b = ReplicateRng::from_state(&state);
///
/// assert_eq!(a.gen_uniform().to_bits(), b.gen_uniform().to_bits());
/// ```
#[derive(Clone, Debug)]
pub struct ReplicateRng {
    /// The underlying stream cipher generator.
    inner: ChaCha12Rng,
}

impl ReplicateRng {
    /// Creates a generator positioned at the start of the stream for `seed`.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha12Rng::seed_from_u64(seed),
        }
    }

    /// Restores a generator from a captured state.
    pub fn from_state(state: &SeedState) -> Self {
        let mut inner = ChaCha12Rng::from_seed(state.key());
        inner.set_stream(state.stream());
        inner.set_word_pos(u128::from(state.word_pos()));
        Self { inner }
    }

    /// Captures the current state.
    ///
    /// Returns `None` once the stream position no longer fits the 64-bit
    /// persisted word counter.
    pub fn capture(&self) -> Option<SeedState> {
        let word_pos = u64::try_from(self.inner.get_word_pos()).ok()?;
        Some(SeedState::new(
            self.inner.get_seed(),
            self.inner.get_stream(),
            word_pos,
        ))
    }

    /// Returns the current position in the stream, in 32-bit words.
    #[inline]
    pub fn word_pos(&self) -> u128 {
        self.inner.get_word_pos()
    }

    /// Advances the stream by `draws` uniform draws without generating them.
    #[inline]
    pub fn skip_draws(&mut self, draws: u64) {
        let target = self.inner.get_word_pos() + u128::from(draws) * WORDS_PER_DRAW;
        self.inner.set_word_pos(target);
    }

    /// Generates a single uniform random value in [0, 1).
    #[inline]
    pub fn gen_uniform(&mut self) -> f64 {
        self.inner.gen()
    }
}

impl UniformSource for ReplicateRng {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.gen_uniform()
    }
}
