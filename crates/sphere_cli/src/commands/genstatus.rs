//! Genstatus command implementation
//!
//! Writes one deterministic seed state per replicate into a status directory.

use sphere_engine::rng::generate_status_files;
use sphere_engine::StatusDirectory;
use tracing::info;

use crate::config::AppConfig;
use crate::Result;

/// Run the genstatus command
///
/// Files land in the configured status directory, so a later `run` with the
/// same configuration reads them back.
pub fn run(config: &AppConfig) -> Result<()> {
    let experiment = config.experiment()?;
    let status_dir = config.status_dir_or_default();
    info!(
        replicates = experiment.replicates(),
        draws_per_replicate = experiment.draws_per_replicate(),
        dir = %status_dir.display(),
        "generating status files"
    );

    let dir = StatusDirectory::new(status_dir);
    let written = generate_status_files(
        &dir,
        experiment.replicates(),
        experiment.draws_per_replicate(),
    )?;

    for path in &written {
        println!("saved {}", path.display());
    }
    Ok(())
}
