//! # Random Number Generation Infrastructure
//!
//! Every replicate draws from its own [`ReplicateRng`], restored from a
//! deterministic [`SeedState`] fetched by sequence index from a
//! [`SeedStateProvider`].
//!
//! ## Reproducibility
//!
//! A state pins the generator key, stream and word position. Restoring the
//! same state twice yields the same sequence bit for bit, which is what the
//! concurrent/sequential comparison in [`crate::experiment`] checks.
//!
//! ## Providers
//!
//! - [`StatusDirectory`]: reads `status-NN.json` files written by
//!   [`generate_status_files`]
//! - [`DerivedSeeds`]: derives the same states in memory by skipping the
//!   master stream forward, no disk involved
//!
//! ## Usage Example
//!
//! ```rust
//! use sphere_engine::rng::{DerivedSeeds, ReplicateRng, SeedStateProvider};
//!
//! let seeds = DerivedSeeds::new(3_000);
//! let state = seeds.seed_state(2).unwrap();
//!
//! let mut rng = ReplicateRng::from_state(&state);
//! let u = rng.gen_uniform();
//! assert!((0.0..1.0).contains(&u));
//! ```

mod prng;
mod state;
mod status;

pub use prng::{ReplicateRng, UniformSource, WORDS_PER_DRAW};
pub use state::{DerivedSeeds, SeedState, SeedStateProvider, MASTER_SEED};
pub use status::{generate_status_files, StatusDirectory};
