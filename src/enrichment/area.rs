//! The area-under-curve enrichment score.
//!
//! Hits (indicator values above zero) are normalized to a running curve that is
//! compared against a straight reference line. Front-loaded hits lift the curve above
//! the line and give a positive score, back-loaded hits give a negative one, and an
//! even spread scores close to zero.

use crate::enrichment::backend::ArrayBackend;

/// Score of one indicator sequence together with the curves it was derived from.
#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    pub score: f64,
    /// Hit indicators scaled so they sum to the bin width.
    pub normalized_scores: Vec<f64>,
    /// Straight-line reference from 0 to the bin width.
    pub trend: Vec<f64>,
    pub cumulative_score: Vec<f64>,
}

/// Compute the enrichment score of `indicators` in their given order.
///
/// Returns an error for an empty sequence or one without any hits, since the
/// normalization is undefined there.
pub fn area_score(
    backend: &dyn ArrayBackend,
    indicators: &[f64],
) -> anyhow::Result<EnrichmentResult> {
    let n = indicators.len();
    if n == 0 {
        return Err(anyhow::anyhow!("Indicator sequence cannot be empty"));
    }

    let hits: Vec<f64> = indicators
        .iter()
        .map(|&v| if v > 0.0 { 1.0 } else { 0.0 })
        .collect();
    let total = backend.sum(&hits);
    if total == 0.0 {
        return Err(anyhow::anyhow!(
            "Indicator sequence of length {} contains no hits",
            n
        ));
    }

    let binwidth = 1.0 / n as f64;
    let normalized_scores: Vec<f64> = hits.iter().map(|&h| h / total * binwidth).collect();
    let cumulative_score = backend.cumsum(&normalized_scores);

    let mut trend: Vec<f64> = backend
        .linspace(0.0, 1.0, n)
        .into_iter()
        .map(|t| t * binwidth)
        .collect();
    if let Some(last) = trend.last_mut() {
        *last = binwidth;
    }

    let score = (backend.trapz(&cumulative_score) - backend.trapz(&trend)) * 2.0;

    tracing::debug!(
        binwidth,
        normalized_sum = backend.sum(&normalized_scores),
        cumulative_sum = backend.sum(&cumulative_score),
        trend_sum = backend.sum(&trend),
        trend_len = trend.len(),
        area = score,
        "area score computed"
    );

    Ok(EnrichmentResult {
        score,
        normalized_scores,
        trend,
        cumulative_score,
    })
}
