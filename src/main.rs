use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use area_statistics::cli::Cli;
use area_statistics::pipeline::run_area;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = cli.into_config();
    tracing::info!(
        backend = %config.engine.backend,
        workers = config.workers,
        label = %config.run_label,
        "starting AREA analysis"
    );

    let outcome = run_area(&config)?;
    if outcome.is_complete() {
        tracing::info!(path = %outcome.adjusted_path.display(), "AREA analysis completed");
        Ok(ExitCode::SUCCESS)
    } else {
        for failure in &outcome.report.failures {
            tracing::warn!(attribute = %failure.attribute, error = %failure.error, "attribute group failed");
        }
        tracing::warn!(
            failed_groups = outcome.report.failures.len(),
            "AREA analysis completed with partial results"
        );
        Ok(ExitCode::from(2))
    }
}
