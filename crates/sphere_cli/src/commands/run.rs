//! Run command implementation
//!
//! Runs the concurrent pass, prints its summary, then verifies every
//! replicate sequentially against it.

use sphere_engine::report::{EstimationLine, SequentialTimeLine, VerdictLine};
use sphere_engine::{
    DerivedSeeds, EstimationError, Experiment, ExperimentConfig, ExperimentOutcome,
    SeedStateProvider, StatusDirectory,
};
use tracing::{info, warn};

use crate::config::{AppConfig, OutputFormat};
use crate::Result;

/// Run the run command
pub async fn run(config: &AppConfig) -> Result<()> {
    let experiment = config.experiment()?;
    match &config.status_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "seeding from status files");
            execute(experiment, StatusDirectory::new(dir), config.format).await
        }
        None => {
            info!("seeding from derived master stream");
            let seeds = DerivedSeeds::new(experiment.draws_per_replicate());
            execute(experiment, seeds, config.format).await
        }
    }
}

async fn execute<P: SeedStateProvider>(
    config: ExperimentConfig,
    provider: P,
    format: OutputFormat,
) -> Result<()> {
    let mut experiment = Experiment::new(config, provider)?;

    let table = format == OutputFormat::Table;
    if table {
        println!("running (concurrent)...");
    }
    let concurrent = experiment.run_concurrent().await?;
    if table {
        for sample in concurrent.samples() {
            println!("{}", EstimationLine(&sample));
        }
    }

    let summary = match concurrent.summarize() {
        Ok(report) => Some(report),
        Err(err @ EstimationError::InsufficientReplicates(_)) => {
            warn!(%err, "skipping confidence report");
            None
        }
        Err(err) => return Err(err.into()),
    };
    if table {
        match &summary {
            Some(report) => println!("\n{report}\n"),
            None => println!("\nno confidence report for a single replicate\n"),
        }
        println!("running (sequential)...");
    }

    let sequential = experiment.run_sequential(&concurrent)?;
    let mismatches = sequential.mismatches().count();
    if mismatches > 0 {
        warn!(mismatches, "reproducibility check failed");
    }

    match format {
        OutputFormat::Table => {
            for check in &sequential.checks {
                println!("{}", VerdictLine(check));
            }
            println!("{}", SequentialTimeLine(&sequential));
        }
        OutputFormat::Json => {
            let outcome = ExperimentOutcome {
                concurrent,
                summary,
                sequential,
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
