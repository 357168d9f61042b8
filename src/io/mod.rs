//! CSV input and output of tables, name lists and result files.

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::table::{Column, Table};
use crate::testing::SignificanceRecord;

/// Read a CSV table keyed by `key_column`.
///
/// With `index_column` the first column is an unnamed row index and is dropped before
/// the key column is looked up. Empty cells load as NaN.
pub fn read_table(path: &Path, key_column: &str, index_column: bool) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .clone();
    let skip = usize::from(index_column);
    let names: Vec<&str> = headers.iter().skip(skip).collect();

    let key_idx = names
        .iter()
        .position(|&name| name == key_column)
        .with_context(|| {
            format!(
                "key column '{}' not found in {}",
                key_column,
                path.display()
            )
        })?;

    let mut keys = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); names.len()];

    for (row, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("failed to read row {} of {}", row + 1, path.display()))?;
        for (col, field) in record.iter().skip(skip).enumerate() {
            if col == key_idx {
                keys.push(field.to_string());
                continue;
            }
            let field = field.trim();
            let value = if field.is_empty() {
                f64::NAN
            } else {
                field.parse::<f64>().with_context(|| {
                    format!(
                        "non-numeric value '{}' in column '{}' row {} of {}",
                        field,
                        names[col],
                        row + 1,
                        path.display()
                    )
                })?
            };
            values[col].push(value);
        }
    }

    let columns = names
        .iter()
        .zip(values)
        .enumerate()
        .filter(|(col, _)| *col != key_idx)
        .map(|(_, (name, v))| Column::new(*name, v))
        .collect();

    let table = Table::new(key_column, keys, columns)
        .with_context(|| format!("invalid table in {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        rows = table.n_rows(),
        columns = table.columns().len(),
        "table loaded"
    );
    Ok(table)
}

/// Read a newline-delimited list of names. Blank lines are skipped.
pub fn read_name_list(path: &Path) -> Result<Vec<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// [`read_name_list`] for an optional path, as a set.
pub fn read_name_set(path: Option<&Path>) -> Result<Option<HashSet<String>>> {
    path.map(|p| read_name_list(p).map(|names| names.into_iter().collect()))
        .transpose()
}

/// Write `records` as CSV with a header derived from their field names.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    writer.flush()?;
    tracing::debug!(path = %path.display(), rows = records.len(), "table written");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RawSignificance {
    attribute: String,
    ranking_column: String,
    #[serde(rename = "NES")]
    nes: String,
    pval: String,
}

fn lenient_float(field: &str) -> f64 {
    field.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Read a pre-adjustment result table. Unparsable NES or p-values become NaN.
pub fn read_significance(path: &Path) -> Result<Vec<SignificanceRecord>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut records = Vec::new();
    for (row, raw) in reader.deserialize::<RawSignificance>().enumerate() {
        let raw =
            raw.with_context(|| format!("failed to read row {} of {}", row + 1, path.display()))?;
        records.push(SignificanceRecord {
            attribute: raw.attribute,
            ranking_column: raw.ranking_column,
            nes: lenient_float(&raw.nes),
            pval: lenient_float(&raw.pval),
        });
    }
    Ok(records)
}
