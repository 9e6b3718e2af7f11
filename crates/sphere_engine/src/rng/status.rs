//! File-backed seed states.
//!
//! One JSON file per replicate, `status-NN.json`, NN being the two-digit
//! (or wider) sequence index.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::state::{DerivedSeeds, SeedState, SeedStateProvider};
use crate::error::SeedError;

/// Directory of persisted seed states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusDirectory {
    root: PathBuf,
}

impl StatusDirectory {
    /// Opens a status directory. Nothing is read until a state is requested.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the status files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the status file for `index`.
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.root.join(format!("status-{index:02}.json"))
    }

    /// Persists `state` as the status for `index`, replacing any previous file.
    pub fn save(&self, index: usize, state: &SeedState) -> Result<PathBuf, SeedError> {
        let path = self.path_for(index);
        let body = serde_json::to_string_pretty(state).map_err(|e| SeedError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&path, body).map_err(|source| SeedError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl SeedStateProvider for StatusDirectory {
    fn seed_state(&self, index: usize) -> Result<SeedState, SeedError> {
        let path = self.path_for(index);
        debug!(path = %path.display(), "loading status");

        let body = fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SeedError::Missing { path: path.clone() }
            } else {
                SeedError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        serde_json::from_str(&body).map_err(|e| SeedError::Corrupt {
            path,
            reason: e.to_string(),
        })
    }
}

/// Writes one status file per replicate into `dir`.
///
/// Replicate `i` receives the master stream advanced by
/// `(i + 1) × draws_per_replicate` draws, the same state
/// [`DerivedSeeds`] hands out for that index. The directory is created if
/// missing.
///
/// # Errors
///
/// Returns `SeedError` if the directory or any file cannot be written.
pub fn generate_status_files(
    dir: &StatusDirectory,
    replicates: usize,
    draws_per_replicate: u64,
) -> Result<Vec<PathBuf>, SeedError> {
    fs::create_dir_all(dir.root()).map_err(|source| SeedError::Io {
        path: dir.root().to_path_buf(),
        source,
    })?;

    let seeds = DerivedSeeds::new(draws_per_replicate);
    let mut written = Vec::with_capacity(replicates);
    for index in 0..replicates {
        let state = seeds.seed_state(index)?;
        let path = dir.save(index, &state)?;
        info!(index, path = %path.display(), word_pos = state.word_pos(), "saved status");
        written.push(path);
    }
    Ok(written)
}
