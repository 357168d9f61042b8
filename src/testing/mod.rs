use num_traits::Float;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod adjust;
pub mod correction;
pub mod inference;

pub mod utils;

#[derive(Debug, Clone)]
pub struct TestResult<T> {
    /// The test statistic value (the normalized enrichment score)
    pub statistic: T,
    /// The p-value of the test
    pub p_value: T,
    /// Additional test-specific information
    pub metadata: HashMap<String, T>,
}

impl<T> TestResult<T>
where
    T: Float,
{
    /// Create a new test result with minimal information
    pub fn new(statistic: T, p_value: T) -> Self {
        TestResult {
            statistic,
            p_value,
            metadata: HashMap::new(),
        }
    }

    /// Add additional metadata
    pub fn with_metadata(mut self, key: &str, value: T) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// Outcome of testing one attribute against one ranking column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceRecord {
    pub attribute: String,
    pub ranking_column: String,
    #[serde(rename = "NES")]
    pub nes: f64,
    pub pval: f64,
}

impl SignificanceRecord {
    /// Whether the p-value can take part in multiple testing correction.
    pub fn has_numeric_pval(&self) -> bool {
        self.pval.is_finite()
    }
}

/// A significance record with its family-wide adjusted p-values.
///
/// Adjusted values are `None` when the raw p-value was not numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustedRecord {
    pub attribute: String,
    pub ranking_column: String,
    #[serde(rename = "NES")]
    pub nes: f64,
    pub pval: f64,
    pub p_bonferroni: Option<f64>,
    pub p_holm: Option<f64>,
    pub p_fdr_bh: Option<f64>,
    pub p_fdr_by: Option<f64>,
}

impl AdjustedRecord {
    pub fn unadjusted(record: SignificanceRecord) -> Self {
        AdjustedRecord {
            attribute: record.attribute,
            ranking_column: record.ranking_column,
            nes: record.nes,
            pval: record.pval,
            p_bonferroni: None,
            p_holm: None,
            p_fdr_bh: None,
            p_fdr_by: None,
        }
    }

    pub fn significance(&self) -> SignificanceRecord {
        SignificanceRecord {
            attribute: self.attribute.clone(),
            ranking_column: self.ranking_column.clone(),
            nes: self.nes,
            pval: self.pval,
        }
    }
}
