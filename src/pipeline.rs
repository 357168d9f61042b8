//! End-to-end run: load, plan, evaluate, adjust, persist.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::RunConfig;
use crate::io;
use crate::orchestrate::{self, OrchestratorOptions, RunReport};
use crate::plan::{self, ColumnFilters};
use crate::testing::adjust::adjust;

/// Files written by a run and the orchestrator's report.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub plan_path: PathBuf,
    pub unadjusted_path: PathBuf,
    pub adjusted_path: PathBuf,
    pub report: RunReport,
}

impl PipelineOutcome {
    pub fn is_complete(&self) -> bool {
        self.report.is_complete()
    }
}

pub fn run_area(config: &RunConfig) -> Result<PipelineOutcome> {
    config.validate()?;

    let attributes = io::read_table(
        &config.binary_attribute_file,
        &config.common_column,
        config.index_column,
    )?;
    let rankings = io::read_table(&config.values_file, &config.common_column, config.index_column)?;

    let filters = ColumnFilters {
        include_attributes: io::read_name_set(config.include_attributes_file.as_deref())?,
        exclude_attributes: io::read_name_set(config.exclude_attributes_file.as_deref())?,
        include_rankings: io::read_name_set(config.include_values_file.as_deref())?,
        exclude_rankings: io::read_name_set(config.exclude_values_file.as_deref())?,
    };
    let allowed_samples = io::read_name_set(config.sample_file.as_deref())?;

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed to create {}", config.out_dir.display()))?;

    let tasks = plan::plan(&rankings, &attributes, &filters);
    let plan_path = config.plan_path();
    io::write_records(&plan_path, &tasks)?;

    let options = OrchestratorOptions {
        workers: config.workers,
        engine: config.engine,
        shuffle_seed: config.shuffle_seed,
        failure_policy: config.failure_policy,
        allowed_samples,
    };
    let report = orchestrate::run(&tasks, &rankings, &attributes, &options)?;
    let unadjusted_path = config.unadjusted_path();
    io::write_records(&unadjusted_path, &report.records)?;

    let adjusted_path = config.adjusted_path();
    readjust(&unadjusted_path, &adjusted_path)?;

    if !report.is_complete() {
        tracing::warn!(
            failed_groups = report.failures.len(),
            groups = report.groups,
            "run finished with skipped attribute groups"
        );
    }
    tracing::info!(path = %adjusted_path.display(), "adjusted results written");

    Ok(PipelineOutcome {
        plan_path,
        unadjusted_path,
        adjusted_path,
        report,
    })
}

/// Apply the multiple testing correction to a persisted pre-adjustment table.
pub fn readjust(unadjusted: &Path, adjusted: &Path) -> Result<()> {
    let records = io::read_significance(unadjusted)?;
    let table = adjust(records)?;
    io::write_records(adjusted, &table)
}
