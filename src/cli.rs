use clap::Parser;
use std::path::PathBuf;

use crate::config::{EngineSettings, FailurePolicy, RunConfig};
use crate::enrichment::Backend;

#[derive(Debug, Parser)]
#[command(
    name = "area-statistics",
    version,
    about = "Rank enrichment of binary attributes along continuous rankings"
)]
pub struct Cli {
    #[arg(long, short = 'b', alias = "baf", help = "CSV of 0/1 attributes per sample")]
    pub binary_attribute_file: PathBuf,

    #[arg(long, short = 'v', alias = "vf", help = "CSV of ranking values per sample")]
    pub values_file: PathBuf,

    #[arg(long, short = 'c', alias = "cc", help = "Sample key column shared by both tables")]
    pub common_column: String,

    #[arg(long, short = 'o', alias = "od")]
    pub outdir: PathBuf,

    #[arg(long, short = 'p', default_value_t = 4, help = "Number of worker threads")]
    pub processes: usize,

    #[arg(long, help = "Only test ranking columns listed in this file")]
    pub include_values_file: Option<PathBuf>,

    #[arg(long, help = "Only test attributes listed in this file")]
    pub include_binary_attribute_file: Option<PathBuf>,

    #[arg(long, help = "Skip ranking columns listed in this file")]
    pub exclude_values_file: Option<PathBuf>,

    #[arg(long, help = "Skip attributes listed in this file")]
    pub exclude_binary_attribute_file: Option<PathBuf>,

    #[arg(long, help = "Only use samples listed in this file")]
    pub sample_file: Option<PathBuf>,

    #[arg(long, default_value_t = 1000)]
    pub permutations: usize,

    #[arg(long, default_value_t = 42, help = "Seed of the permutation null")]
    pub seed: u64,

    #[arg(long, help = "Seed of the tie-breaking row shuffle (random when omitted)")]
    pub shuffle_seed: Option<u64>,

    #[arg(long, default_value = "cpu", help = "Numeric array backend")]
    pub backend: Backend,

    #[arg(long, default_value = "fail-fast", help = "fail-fast|best-effort")]
    pub failure_policy: FailurePolicy,

    #[arg(
        long,
        default_value_t = false,
        help = "Inputs have no leading row-index column"
    )]
    pub no_index_column: bool,

    #[arg(long, default_value = "area_scores", help = "Prefix of the output files")]
    pub run_label: String,

    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    pub fn into_config(self) -> RunConfig {
        let mut config = RunConfig::new(
            self.binary_attribute_file,
            self.values_file,
            self.common_column,
            self.outdir,
        );
        config.workers = self.processes;
        config.run_label = self.run_label;
        config.include_values_file = self.include_values_file;
        config.include_attributes_file = self.include_binary_attribute_file;
        config.exclude_values_file = self.exclude_values_file;
        config.exclude_attributes_file = self.exclude_binary_attribute_file;
        config.sample_file = self.sample_file;
        config.index_column = !self.no_index_column;
        config.shuffle_seed = self.shuffle_seed;
        config.failure_policy = self.failure_policy;
        config.engine = EngineSettings {
            permutations: self.permutations,
            seed: self.seed,
            backend: self.backend,
        };
        config
    }
}
