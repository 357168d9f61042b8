//! Significance of an observed enrichment score against its permutation null.
//!
//! Positive and negative scores are calibrated against opposite halves of the null:
//! a positive score is compared with a Gaussian fitted to the negative null scores
//! (upper tail), a negative or zero score with one fitted to the positive null scores
//! (lower tail). The normalized enrichment score divides by the mean of that half.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::testing::TestResult;
use crate::testing::utils::{mean, population_std};

/// Compute the NES and one-sided p-value of `actual` given a null distribution.
///
/// When the selected half of the null is empty both values are NaN. A half whose
/// spread is zero still yields a NES but no p-value.
pub fn normalized_enrichment(actual: f64, null: &[f64]) -> TestResult<f64> {
    let positive = actual > 0.0;
    let half: Vec<f64> = if positive {
        null.iter().copied().filter(|&s| s < 0.0).collect()
    } else {
        null.iter().copied().filter(|&s| s > 0.0).collect()
    };

    let mu = mean(&half);
    let sigma = population_std(&half);

    let nes = if positive { actual / mu } else { -(actual / mu) };

    let p_value = match Normal::new(mu, sigma) {
        Ok(normal) if sigma > 0.0 => {
            if positive {
                1.0 - normal.cdf(actual)
            } else {
                normal.cdf(actual)
            }
        }
        _ => f64::NAN,
    };

    TestResult::new(nes, p_value)
        .with_metadata("null_mean", mu)
        .with_metadata("null_std", sigma)
        .with_metadata("null_half_size", half.len() as f64)
}

/// Shorthand returning `(NES, p-value)`.
pub fn nes_pval(actual: f64, null: &[f64]) -> (f64, f64) {
    let result = normalized_enrichment(actual, null);
    (result.statistic, result.p_value)
}
