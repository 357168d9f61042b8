//! The work plan: one disposition per (ranking column, attribute) pair.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Run,
    IgnoredByExcludeList,
    IgnoredNotInIncludeList,
    ExcludedConstantRanking,
    ExcludedConstantAttribute,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Disposition::Run => "run",
            Disposition::IgnoredByExcludeList => "ignored_by_exclude_list",
            Disposition::IgnoredNotInIncludeList => "ignored_not_in_include_list",
            Disposition::ExcludedConstantRanking => "excluded_constant_ranking",
            Disposition::ExcludedConstantAttribute => "excluded_constant_attribute",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub ranking_column: String,
    pub attribute: String,
    pub disposition: Disposition,
}

/// Optional include and exclude lists for each side of the cross product.
#[derive(Debug, Clone, Default)]
pub struct ColumnFilters {
    pub include_attributes: Option<HashSet<String>>,
    pub exclude_attributes: Option<HashSet<String>>,
    pub include_rankings: Option<HashSet<String>>,
    pub exclude_rankings: Option<HashSet<String>>,
}

/// Build the full plan over every ranking column × attribute column.
///
/// Later rules override earlier ones: exclude lists, then include lists, then
/// constant ranking columns, then constant attribute columns.
pub fn plan(rankings: &Table, attributes: &Table, filters: &ColumnFilters) -> Vec<TaskRecord> {
    let constant_rankings: HashSet<&str> = rankings
        .columns()
        .iter()
        .filter(|c| c.is_constant())
        .map(|c| c.name.as_str())
        .collect();
    let constant_attributes: HashSet<&str> = attributes
        .columns()
        .iter()
        .filter(|c| c.is_constant())
        .map(|c| c.name.as_str())
        .collect();

    let mut tasks = Vec::with_capacity(rankings.columns().len() * attributes.columns().len());

    for ranking in rankings.column_names() {
        for attribute in attributes.column_names() {
            let mut disposition = Disposition::Run;

            if contains(&filters.exclude_attributes, attribute) {
                disposition = Disposition::IgnoredByExcludeList;
            }
            if contains(&filters.exclude_rankings, ranking) {
                disposition = Disposition::IgnoredByExcludeList;
            }
            if misses(&filters.include_attributes, attribute) {
                disposition = Disposition::IgnoredNotInIncludeList;
            }
            if misses(&filters.include_rankings, ranking) {
                disposition = Disposition::IgnoredNotInIncludeList;
            }
            if constant_rankings.contains(ranking) {
                disposition = Disposition::ExcludedConstantRanking;
            }
            if constant_attributes.contains(attribute) {
                disposition = Disposition::ExcludedConstantAttribute;
            }

            tasks.push(TaskRecord {
                ranking_column: ranking.to_string(),
                attribute: attribute.to_string(),
                disposition,
            });
        }
    }

    let summary = summarize(&tasks);
    tracing::info!(
        pairs = tasks.len(),
        run = summary.get(&Disposition::Run).copied().unwrap_or(0),
        "task plan built"
    );
    for (disposition, count) in &summary {
        tracing::debug!(%disposition, count, "plan disposition");
    }

    tasks
}

/// Pair counts per disposition.
pub fn summarize(tasks: &[TaskRecord]) -> BTreeMap<Disposition, usize> {
    let mut counts = BTreeMap::new();
    for task in tasks {
        *counts.entry(task.disposition).or_insert(0) += 1;
    }
    counts
}

fn contains(list: &Option<HashSet<String>>, name: &str) -> bool {
    list.as_ref().is_some_and(|set| set.contains(name))
}

fn misses(list: &Option<HashSet<String>>, name: &str) -> bool {
    list.as_ref().is_some_and(|set| !set.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn set(v: &[&str]) -> Option<HashSet<String>> {
        Some(v.iter().map(|s| s.to_string()).collect())
    }

    fn tables() -> (Table, Table) {
        let keys: Vec<String> = ["s1", "s2", "s3"].iter().map(|s| s.to_string()).collect();
        let rankings = Table::new(
            "sample",
            keys.clone(),
            vec![
                Column::new("GENE1", vec![1.0, 2.0, 3.0]),
                Column::new("FLAT", vec![5.0, 5.0, 5.0]),
                Column::new("GENE2", vec![3.0, 1.0, 2.0]),
            ],
        )
        .unwrap();
        let attributes = Table::new(
            "sample",
            keys,
            vec![
                Column::new("asthma", vec![1.0, 0.0, 1.0]),
                Column::new("none", vec![0.0, 0.0, 0.0]),
                Column::new("all", vec![1.0, 1.0, 1.0]),
            ],
        )
        .unwrap();
        (rankings, attributes)
    }

    fn disposition(tasks: &[TaskRecord], ranking: &str, attribute: &str) -> Disposition {
        tasks
            .iter()
            .find(|t| t.ranking_column == ranking && t.attribute == attribute)
            .map(|t| t.disposition)
            .unwrap()
    }

    #[test]
    fn test_full_cross_product_ranking_outer() {
        let (rankings, attributes) = tables();
        let tasks = plan(&rankings, &attributes, &ColumnFilters::default());
        assert_eq!(tasks.len(), 9);
        assert_eq!(tasks[0].ranking_column, "GENE1");
        assert_eq!(tasks[0].attribute, "asthma");
        assert_eq!(tasks[1].attribute, "none");
        assert_eq!(tasks[3].ranking_column, "FLAT");
        assert_eq!(tasks[0].disposition, Disposition::Run);
    }

    #[test]
    fn test_constant_columns_are_excluded() {
        let (rankings, attributes) = tables();
        let tasks = plan(&rankings, &attributes, &ColumnFilters::default());
        for ranking in ["GENE1", "GENE2"] {
            assert_eq!(
                disposition(&tasks, ranking, "none"),
                Disposition::ExcludedConstantAttribute
            );
            assert_eq!(
                disposition(&tasks, ranking, "all"),
                Disposition::ExcludedConstantAttribute
            );
        }
        assert_eq!(
            disposition(&tasks, "FLAT", "asthma"),
            Disposition::ExcludedConstantRanking
        );
        // attribute rule is applied last
        assert_eq!(
            disposition(&tasks, "FLAT", "none"),
            Disposition::ExcludedConstantAttribute
        );
    }

    #[test]
    fn test_exclude_holds_for_included_column() {
        let (rankings, attributes) = tables();
        let filters = ColumnFilters {
            exclude_rankings: set(&["GENE2"]),
            include_rankings: set(&["GENE2", "FLAT"]),
            ..Default::default()
        };
        let tasks = plan(&rankings, &attributes, &filters);
        assert_eq!(
            disposition(&tasks, "GENE2", "asthma"),
            Disposition::IgnoredByExcludeList
        );
        assert_eq!(
            disposition(&tasks, "GENE1", "asthma"),
            Disposition::IgnoredNotInIncludeList
        );
    }

    #[test]
    fn test_attribute_lists() {
        let (rankings, attributes) = tables();
        let filters = ColumnFilters {
            exclude_attributes: set(&["asthma"]),
            ..Default::default()
        };
        let tasks = plan(&rankings, &attributes, &filters);
        assert_eq!(
            disposition(&tasks, "GENE1", "asthma"),
            Disposition::IgnoredByExcludeList
        );

        let filters = ColumnFilters {
            include_attributes: set(&["none"]),
            ..Default::default()
        };
        let tasks = plan(&rankings, &attributes, &filters);
        assert_eq!(
            disposition(&tasks, "GENE1", "asthma"),
            Disposition::IgnoredNotInIncludeList
        );
        assert_eq!(
            disposition(&tasks, "GENE1", "none"),
            Disposition::ExcludedConstantAttribute
        );
    }

    #[test]
    fn test_constant_attribute_overrides_exclude_list() {
        let (rankings, attributes) = tables();
        let filters = ColumnFilters {
            exclude_attributes: set(&["none"]),
            exclude_rankings: set(&["GENE1"]),
            ..Default::default()
        };
        let tasks = plan(&rankings, &attributes, &filters);
        assert_eq!(
            disposition(&tasks, "GENE2", "none"),
            Disposition::ExcludedConstantAttribute
        );
        assert_eq!(
            disposition(&tasks, "GENE1", "none"),
            Disposition::ExcludedConstantAttribute
        );
        assert_eq!(
            disposition(&tasks, "GENE1", "asthma"),
            Disposition::IgnoredByExcludeList
        );
    }

    #[test]
    fn test_summary_counts() {
        let (rankings, attributes) = tables();
        let tasks = plan(&rankings, &attributes, &ColumnFilters::default());
        let summary = summarize(&tasks);
        assert_eq!(summary[&Disposition::Run], 2);
        assert_eq!(summary[&Disposition::ExcludedConstantAttribute], 6);
        assert_eq!(summary[&Disposition::ExcludedConstantRanking], 1);
        assert_eq!(Disposition::IgnoredByExcludeList.to_string(), "ignored_by_exclude_list");
    }
}
