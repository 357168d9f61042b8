//! Keyed numeric tables and the per-attribute join used by the orchestrator.

use std::collections::{HashMap, HashSet};

/// A named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }

    /// True when every value equals the first one. Empty columns count as constant,
    /// and NaN compares unequal to everything.
    pub fn is_constant(&self) -> bool {
        match self.values.first() {
            None => true,
            Some(first) => self.values.iter().all(|v| v == first),
        }
    }
}

/// Rows identified by a sample key, with one value per row in each column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    key_column: String,
    keys: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(
        key_column: impl Into<String>,
        keys: Vec<String>,
        columns: Vec<Column>,
    ) -> anyhow::Result<Self> {
        let key_column = key_column.into();
        for column in &columns {
            if column.values.len() != keys.len() {
                return Err(anyhow::anyhow!(
                    "Column '{}' has {} values but the table has {} rows",
                    column.name,
                    column.values.len(),
                    keys.len()
                ));
            }
            if column.name == key_column {
                return Err(anyhow::anyhow!(
                    "Key column '{}' cannot also be a value column",
                    key_column
                ));
            }
        }
        Ok(Table {
            key_column,
            keys,
            columns,
        })
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Value columns in file order, the key column excluded.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn n_rows(&self) -> usize {
        self.keys.len()
    }
}

/// One attribute joined with the ranking columns it is tested against.
///
/// Row `i` of `indicators` and of every entry in `rankings` refer to the same sample.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedFrame {
    pub keys: Vec<String>,
    pub indicators: Vec<f64>,
    pub rankings: Vec<Column>,
}

impl JoinedFrame {
    /// Inner join of `attribute` with `ranking_columns` of `rankings` on the sample key.
    ///
    /// Rows follow the attribute table; a key repeated in the ranking table produces
    /// one row per match. When `allowed` is given, other keys are dropped.
    pub fn join(
        attributes: &Table,
        attribute: &str,
        rankings: &Table,
        ranking_columns: &[String],
        allowed: Option<&HashSet<String>>,
    ) -> anyhow::Result<Self> {
        let attribute_column = attributes
            .column(attribute)
            .ok_or_else(|| anyhow::anyhow!("Attribute column '{}' not found", attribute))?;

        let selected: Vec<&Column> = ranking_columns
            .iter()
            .map(|name| {
                rankings
                    .column(name)
                    .ok_or_else(|| anyhow::anyhow!("Ranking column '{}' not found", name))
            })
            .collect::<anyhow::Result<_>>()?;

        let mut ranking_rows: HashMap<&str, Vec<usize>> = HashMap::new();
        for (row, key) in rankings.keys().iter().enumerate() {
            ranking_rows.entry(key.as_str()).or_default().push(row);
        }

        let mut keys = Vec::new();
        let mut indicators = Vec::new();
        let mut ranking_values: Vec<Vec<f64>> = vec![Vec::new(); selected.len()];

        for (row, key) in attributes.keys().iter().enumerate() {
            if allowed.is_some_and(|set| !set.contains(key)) {
                continue;
            }
            let Some(matches) = ranking_rows.get(key.as_str()) else {
                continue;
            };
            for &ranking_row in matches {
                keys.push(key.clone());
                indicators.push(attribute_column.values[row]);
                for (values, column) in ranking_values.iter_mut().zip(&selected) {
                    values.push(column.values[ranking_row]);
                }
            }
        }

        let rankings = selected
            .iter()
            .zip(ranking_values)
            .map(|(column, values)| Column::new(column.name.clone(), values))
            .collect();

        Ok(JoinedFrame {
            keys,
            indicators,
            rankings,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.keys.len()
    }

    /// Reorder every row by `order`, where `order[i]` is the old index of new row `i`.
    pub fn reorder(&mut self, order: &[usize]) {
        self.keys = order.iter().map(|&i| self.keys[i].clone()).collect();
        self.indicators = order.iter().map(|&i| self.indicators[i]).collect();
        for column in &mut self.rankings {
            column.values = order.iter().map(|&i| column.values[i]).collect();
        }
    }

    /// Attribute indicators ordered by a stable ascending sort of ranking column `index`.
    /// NaN values sort last.
    pub fn indicators_sorted_by(&self, index: usize) -> Vec<f64> {
        let values = &self.rankings[index].values;
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| match (values[a].is_nan(), values[b].is_nan()) {
            (false, false) => values[a].total_cmp(&values[b]),
            (lhs, rhs) => lhs.cmp(&rhs),
        });
        order.iter().map(|&i| self.indicators[i]).collect()
    }
}
