//! Run configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Result, bail};

use crate::enrichment::Backend;
use crate::enrichment::null::{DEFAULT_PERMUTATIONS, DEFAULT_SEED};

/// What to do when one attribute group fails during the parallel stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the run with the failing attribute's error.
    #[default]
    FailFast,
    /// Log the failure, keep the other groups' results and report a partial run.
    BestEffort,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::FailFast => f.write_str("fail-fast"),
            FailurePolicy::BestEffort => f.write_str("best-effort"),
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fail-fast" => Ok(FailurePolicy::FailFast),
            "best-effort" => Ok(FailurePolicy::BestEffort),
            other => bail!(
                "Unknown failure policy '{}', expected fail-fast or best-effort",
                other
            ),
        }
    }
}

/// Settings of the statistic itself, shared by every attribute group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub permutations: usize,
    /// Seed of the permutation null generator.
    pub seed: u64,
    pub backend: Backend,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            permutations: DEFAULT_PERMUTATIONS,
            seed: DEFAULT_SEED,
            backend: Backend::Cpu,
        }
    }
}

/// Everything one pipeline run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub binary_attribute_file: PathBuf,
    pub values_file: PathBuf,
    pub common_column: String,
    pub out_dir: PathBuf,
    /// Prefix of every output file.
    pub run_label: String,
    pub workers: usize,
    pub include_values_file: Option<PathBuf>,
    pub include_attributes_file: Option<PathBuf>,
    pub exclude_values_file: Option<PathBuf>,
    pub exclude_attributes_file: Option<PathBuf>,
    pub sample_file: Option<PathBuf>,
    /// Treat the first CSV column as an unnamed row index and drop it.
    pub index_column: bool,
    /// Seed for the per-group tie-breaking shuffle; `None` draws from the OS.
    pub shuffle_seed: Option<u64>,
    pub failure_policy: FailurePolicy,
    pub engine: EngineSettings,
}

impl RunConfig {
    pub fn new(
        binary_attribute_file: impl Into<PathBuf>,
        values_file: impl Into<PathBuf>,
        common_column: impl Into<String>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        RunConfig {
            binary_attribute_file: binary_attribute_file.into(),
            values_file: values_file.into(),
            common_column: common_column.into(),
            out_dir: out_dir.into(),
            run_label: "area_scores".to_string(),
            workers: 4,
            include_values_file: None,
            include_attributes_file: None,
            exclude_values_file: None,
            exclude_attributes_file: None,
            sample_file: None,
            index_column: true,
            shuffle_seed: None,
            failure_policy: FailurePolicy::default(),
            engine: EngineSettings::default(),
        }
    }

    /// Check everything that can be checked before any data is read.
    pub fn validate(&self) -> Result<()> {
        if self.common_column.trim().is_empty() {
            bail!("Common column name cannot be empty");
        }
        if self.workers == 0 {
            bail!("Worker count must be at least 1");
        }
        if self.run_label.trim().is_empty() {
            bail!("Run label cannot be empty");
        }

        let required = [
            ("binary attribute file", Some(&self.binary_attribute_file)),
            ("values file", Some(&self.values_file)),
        ];
        let optional = [
            ("include values file", self.include_values_file.as_ref()),
            ("include binary attribute file", self.include_attributes_file.as_ref()),
            ("exclude values file", self.exclude_values_file.as_ref()),
            ("exclude binary attribute file", self.exclude_attributes_file.as_ref()),
            ("sample file", self.sample_file.as_ref()),
        ];
        for (what, path) in required.iter().chain(optional.iter()) {
            if let Some(path) = path {
                if !path.is_file() {
                    bail!("{} not found: {}", what, path.display());
                }
            }
        }
        Ok(())
    }

    pub fn plan_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.plan.csv", self.run_label))
    }

    pub fn unadjusted_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.beforeadjpval.csv", self.run_label))
    }

    pub fn adjusted_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.adjpval.csv", self.run_label))
    }
}
