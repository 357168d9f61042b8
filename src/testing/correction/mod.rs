use anyhow::{Result, anyhow};
use std::cmp::Ordering;
use std::fmt;

/// Multiple testing correction methods to control for false positives
/// when performing many statistical tests simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionMethod {
    Bonferroni,
    Holm,
    BenjaminiHochberg,
    BenjaminiYekutieli,
}

impl CorrectionMethod {
    /// Every method applied by the adjustment stage, in output column order.
    pub const ALL: [CorrectionMethod; 4] = [
        CorrectionMethod::Bonferroni,
        CorrectionMethod::Holm,
        CorrectionMethod::BenjaminiHochberg,
        CorrectionMethod::BenjaminiYekutieli,
    ];
}

impl fmt::Display for CorrectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CorrectionMethod::Bonferroni => "bonferroni",
            CorrectionMethod::Holm => "holm",
            CorrectionMethod::BenjaminiHochberg => "fdr_bh",
            CorrectionMethod::BenjaminiYekutieli => "fdr_by",
        };
        f.write_str(name)
    }
}

/// Apply `method` to `p_values`, returning adjusted values in input order.
pub fn correct(p_values: &[f64], method: CorrectionMethod) -> Result<Vec<f64>> {
    match method {
        CorrectionMethod::Bonferroni => bonferroni_correction(p_values),
        CorrectionMethod::Holm => holm_bonferroni_correction(p_values),
        CorrectionMethod::BenjaminiHochberg => benjamini_hochberg_correction(p_values),
        CorrectionMethod::BenjaminiYekutieli => benjamini_yekutieli_correction(p_values),
    }
}

/// Apply Bonferroni correction to p-values
///
/// Bonferroni correction is a simple but conservative method that multiplies
/// each p-value by the number of tests.
///
/// # Arguments
/// * `p_values` - A slice of p-values to adjust
///
/// # Returns
/// * `Result<Vec<f64>>` - Vector of adjusted p-values
///
/// # Example
/// ```
/// use area_statistics::testing::correction::bonferroni_correction;
/// let p_values = vec![0.01, 0.03, 0.05];
/// let adjusted = bonferroni_correction(&p_values).unwrap();
/// ```
pub fn bonferroni_correction(p_values: &[f64]) -> Result<Vec<f64>> {
    let n = p_values.len();

    if n == 0 {
        return Err(anyhow!("Empty p-value array"));
    }

    validate_p_values(p_values)?;

    // Multiply each p-value by n, capping at 1.0
    let adjusted = p_values.iter().map(|&p| (p * n as f64).min(1.0)).collect();

    Ok(adjusted)
}

/// Apply Holm-Bonferroni (step-down) method for controlling family-wise error rate
///
/// The Holm procedure is a step-down method that controls the family-wise error rate (FWER)
/// and is uniformly more powerful than the standard Bonferroni correction.
///
/// # Arguments
/// * `p_values` - A slice of p-values to adjust
///
/// # Returns
/// * `Result<Vec<f64>>` - Vector of adjusted p-values
///
/// # Example
/// ```
/// use area_statistics::testing::correction::holm_bonferroni_correction;
/// let p_values = vec![0.01, 0.03, 0.05];
/// let adjusted = holm_bonferroni_correction(&p_values).unwrap();
/// ```
pub fn holm_bonferroni_correction(p_values: &[f64]) -> Result<Vec<f64>> {
    let n = p_values.len();

    if n == 0 {
        return Err(anyhow!("Empty p-value array"));
    }

    validate_p_values(p_values)?;

    let indexed_p_values = sorted_ascending(p_values);

    let mut adjusted_p_values = vec![0.0; n];
    let mut current_max: f64 = 0.0;

    // Step down from the smallest p-value, never letting the adjustment decrease
    for (i, &(orig_idx, p_val)) in indexed_p_values.iter().enumerate() {
        let adjustment = (p_val * (n - i) as f64).min(1.0);
        current_max = current_max.max(adjustment);
        adjusted_p_values[orig_idx] = current_max;
    }

    Ok(adjusted_p_values)
}

/// Apply Benjamini-Hochberg (BH) procedure for controlling false discovery rate
///
/// The BH procedure controls the false discovery rate (FDR), which is the expected
/// proportion of false positives among all rejected null hypotheses.
///
/// # Arguments
/// * `p_values` - A slice of p-values to adjust
///
/// # Returns
/// * `Result<Vec<f64>>` - Vector of adjusted p-values
///
/// # Example
/// ```
/// use area_statistics::testing::correction::benjamini_hochberg_correction;
/// let p_values = vec![0.01, 0.03, 0.05];
/// let adjusted = benjamini_hochberg_correction(&p_values).unwrap();
/// ```
pub fn benjamini_hochberg_correction(p_values: &[f64]) -> Result<Vec<f64>> {
    let n = p_values.len();
    if n == 0 {
        return Err(anyhow!("Empty p-value array"));
    }

    validate_p_values(p_values)?;

    Ok(step_up(p_values, 1.0))
}

/// Apply Benjamini-Yekutieli (BY) procedure for controlling false discovery rate under dependence
///
/// The BY procedure is a more conservative variant of the BH procedure that is valid
/// under arbitrary dependence structures among the tests.
///
/// # Arguments
/// * `p_values` - A slice of p-values to adjust
///
/// # Returns
/// * `Result<Vec<f64>>` - Vector of adjusted p-values
///
/// # Example
/// ```
/// use area_statistics::testing::correction::benjamini_yekutieli_correction;
/// let p_values = vec![0.01, 0.03, 0.05];
/// let adjusted = benjamini_yekutieli_correction(&p_values).unwrap();
/// ```
pub fn benjamini_yekutieli_correction(p_values: &[f64]) -> Result<Vec<f64>> {
    let n = p_values.len();
    if n == 0 {
        return Err(anyhow!("Empty p-value array"));
    }

    validate_p_values(p_values)?;

    // Calculate the correction factor
    let c_n: f64 = (1..=n).map(|i| 1.0 / i as f64).sum();

    Ok(step_up(p_values, c_n))
}

/// Shared BH/BY step-up: `p * factor * n / rank`, monotone from the largest rank down.
fn step_up(p_values: &[f64], factor: f64) -> Vec<f64> {
    let n = p_values.len();
    let indexed_p_values = sorted_ascending(p_values);

    let mut adjusted_p_values = vec![0.0; n];
    let mut current_min = 1.0;

    // Process from largest to smallest p-value
    for i in (0..n).rev() {
        let (orig_idx, p_val) = indexed_p_values[i];
        let rank = i + 1;

        let adjustment = (p_val * factor * n as f64 / rank as f64).min(1.0);
        current_min = adjustment.min(current_min);
        adjusted_p_values[orig_idx] = current_min;
    }

    adjusted_p_values
}

fn sorted_ascending(p_values: &[f64]) -> Vec<(usize, f64)> {
    let mut indexed_p_values: Vec<(usize, f64)> =
        p_values.iter().enumerate().map(|(i, &p)| (i, p)).collect();
    indexed_p_values.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    indexed_p_values
}

fn validate_p_values(p_values: &[f64]) -> Result<()> {
    for (i, &p) in p_values.iter().enumerate() {
        if !(0.0..=1.0).contains(&p) {
            return Err(anyhow!("Invalid p-value at index {}: {}", i, p));
        }
    }
    Ok(())
}
