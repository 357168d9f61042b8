//! Parallel evaluation of the work plan, one unit of work per attribute.
//!
//! Each attribute is joined with all of its ranking columns once, and a single
//! permutation null is built for it. Every ranking column of that attribute is then
//! scored and tested against the same null, so the permutation cost is paid once
//! per attribute rather than once per pair.

use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};

use anyhow::{Context, Result, anyhow};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::config::{EngineSettings, FailurePolicy};
use crate::enrichment::{area_score, null_distribution};
use crate::plan::{Disposition, TaskRecord};
use crate::table::{JoinedFrame, Table};
use crate::testing::SignificanceRecord;
use crate::testing::inference::normalized_enrichment;

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub workers: usize,
    pub engine: EngineSettings,
    pub shuffle_seed: Option<u64>,
    pub failure_policy: FailurePolicy,
    /// Restrict the join to these sample keys.
    pub allowed_samples: Option<HashSet<String>>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        OrchestratorOptions {
            workers: 4,
            engine: EngineSettings::default(),
            shuffle_seed: None,
            failure_policy: FailurePolicy::FailFast,
            allowed_samples: None,
        }
    }
}

/// The ranking columns to test for one attribute, in plan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroup {
    pub attribute: String,
    pub ranking_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct GroupFailure {
    pub attribute: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub records: Vec<SignificanceRecord>,
    pub failures: Vec<GroupFailure>,
    pub groups: usize,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Collect the runnable tasks by attribute, in order of first appearance.
pub fn group_tasks(tasks: &[TaskRecord]) -> Vec<AttributeGroup> {
    let mut groups: Vec<AttributeGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for task in tasks.iter().filter(|t| t.disposition == Disposition::Run) {
        match index.get(task.attribute.as_str()) {
            Some(&i) => groups[i].ranking_columns.push(task.ranking_column.clone()),
            None => {
                index.insert(task.attribute.as_str(), groups.len());
                groups.push(AttributeGroup {
                    attribute: task.attribute.clone(),
                    ranking_columns: vec![task.ranking_column.clone()],
                });
            }
        }
    }
    groups
}

/// Evaluate one attribute against all of its ranking columns.
///
/// `index` is the group's position in the plan and derives its shuffle seed. The
/// shuffle only breaks ties in the per-column sort; the null is built from the
/// indicator multiset and does not depend on it.
///
/// An attribute that is constant over the joined samples, for example because the
/// allow-list dropped all of its hits, yields NaN records instead of an error.
pub fn run_group(
    group: &AttributeGroup,
    index: usize,
    rankings: &Table,
    attributes: &Table,
    options: &OrchestratorOptions,
) -> Result<Vec<SignificanceRecord>> {
    let mut frame = JoinedFrame::join(
        attributes,
        &group.attribute,
        rankings,
        &group.ranking_columns,
        options.allowed_samples.as_ref(),
    )?;
    if frame.n_rows() == 0 {
        return Err(anyhow!(
            "No samples shared between attribute '{}' and its ranking columns",
            group.attribute
        ));
    }

    if is_degenerate(&frame.indicators) {
        tracing::warn!(
            attribute = %group.attribute,
            samples = frame.n_rows(),
            "attribute is constant over the joined samples, recording NaN results"
        );
        return Ok(frame
            .rankings
            .iter()
            .map(|column| SignificanceRecord {
                attribute: group.attribute.clone(),
                ranking_column: column.name.clone(),
                nes: f64::NAN,
                pval: f64::NAN,
            })
            .collect());
    }

    let mut rng = match options.shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_entropy(),
    };
    let mut order: Vec<usize> = (0..frame.n_rows()).collect();
    order.shuffle(&mut rng);
    frame.reorder(&order);

    let backend = options.engine.backend.array_backend();
    let null = null_distribution(
        backend,
        &frame.indicators,
        options.engine.permutations,
        options.engine.seed,
    )?;

    tracing::debug!(
        attribute = %group.attribute,
        samples = frame.n_rows(),
        columns = group.ranking_columns.len(),
        "null distribution built"
    );

    let mut records = Vec::with_capacity(frame.rankings.len());
    for (i, column) in frame.rankings.iter().enumerate() {
        let ordered = frame.indicators_sorted_by(i);
        let actual = area_score(backend, &ordered)?.score;
        let result = normalized_enrichment(actual, &null);
        let (nes, pval) = (result.statistic, result.p_value);
        tracing::debug!(
            attribute = %group.attribute,
            ranking_column = %column.name,
            score = actual,
            nes,
            pval,
            null_mean = result.metadata.get("null_mean").copied().unwrap_or(f64::NAN),
            null_std = result.metadata.get("null_std").copied().unwrap_or(f64::NAN),
            null_half_size = result.metadata.get("null_half_size").copied().unwrap_or(0.0),
            "pair evaluated"
        );
        records.push(SignificanceRecord {
            attribute: group.attribute.clone(),
            ranking_column: column.name.clone(),
            nes,
            pval,
        });
    }

    Ok(records)
}

/// All hits or no hits once thresholded.
fn is_degenerate(indicators: &[f64]) -> bool {
    let hits = indicators.iter().filter(|&&v| v > 0.0).count();
    hits == 0 || hits == indicators.len()
}

fn run_group_guarded(
    group: &AttributeGroup,
    index: usize,
    rankings: &Table,
    attributes: &Table,
    options: &OrchestratorOptions,
) -> Result<Vec<SignificanceRecord>> {
    catch_unwind(AssertUnwindSafe(|| {
        run_group(group, index, rankings, attributes, options)
    }))
    .unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Err(anyhow!("panicked: {}", message))
    })
    .with_context(|| format!("Attribute group '{}' failed", group.attribute))
}

/// Evaluate every runnable task on a pool of `options.workers` threads.
///
/// Records of one attribute stay in plan order; attributes follow the plan too.
pub fn run(
    tasks: &[TaskRecord],
    rankings: &Table,
    attributes: &Table,
    options: &OrchestratorOptions,
) -> Result<RunReport> {
    let groups = group_tasks(tasks);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.workers)
        .build()
        .context("Failed to build worker pool")?;

    tracing::info!(
        groups = groups.len(),
        workers = options.workers,
        permutations = options.engine.permutations,
        backend = %options.engine.backend,
        policy = %options.failure_policy,
        "evaluating attribute groups"
    );

    let mut report = RunReport {
        groups: groups.len(),
        ..Default::default()
    };

    match options.failure_policy {
        FailurePolicy::FailFast => {
            let per_group: Vec<Vec<SignificanceRecord>> = pool.install(|| {
                groups
                    .par_iter()
                    .enumerate()
                    .map(|(i, group)| run_group_guarded(group, i, rankings, attributes, options))
                    .collect::<Result<_>>()
            })?;
            report.records = per_group.into_iter().flatten().collect();
        }
        FailurePolicy::BestEffort => {
            let outcomes: Vec<Result<Vec<SignificanceRecord>>> = pool.install(|| {
                groups
                    .par_iter()
                    .enumerate()
                    .map(|(i, group)| run_group_guarded(group, i, rankings, attributes, options))
                    .collect()
            });
            for (group, outcome) in groups.iter().zip(outcomes) {
                match outcome {
                    Ok(records) => report.records.extend(records),
                    Err(err) => {
                        tracing::warn!(attribute = %group.attribute, error = %format!("{:#}", err), "attribute group skipped");
                        report.failures.push(GroupFailure {
                            attribute: group.attribute.clone(),
                            error: format!("{:#}", err),
                        });
                    }
                }
            }
        }
    }

    tracing::info!(
        records = report.records.len(),
        failed_groups = report.failures.len(),
        "attribute groups evaluated"
    );

    Ok(report)
}
