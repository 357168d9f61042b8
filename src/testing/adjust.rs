//! Family-wide p-value adjustment of a full result table.

use std::cmp::Ordering;

use crate::testing::correction::{CorrectionMethod, correct};
use crate::testing::{AdjustedRecord, SignificanceRecord};

/// Adjust every numeric p-value in `records` against all the others.
///
/// Records whose p-value is not finite are kept with missing adjusted values and
/// do not count towards the number of tests. The result is sorted ascending by the
/// Benjamini-Hochberg value, missing values last.
pub fn adjust(records: Vec<SignificanceRecord>) -> anyhow::Result<Vec<AdjustedRecord>> {
    let (numeric, non_numeric): (Vec<_>, Vec<_>) =
        records.into_iter().partition(|r| r.has_numeric_pval());

    tracing::info!(
        numeric = numeric.len(),
        non_numeric = non_numeric.len(),
        "adjusting p-values"
    );

    let mut table: Vec<AdjustedRecord> = Vec::with_capacity(numeric.len() + non_numeric.len());

    if !numeric.is_empty() {
        let p_values: Vec<f64> = numeric.iter().map(|r| r.pval).collect();
        let bonferroni = correct(&p_values, CorrectionMethod::Bonferroni)?;
        let holm = correct(&p_values, CorrectionMethod::Holm)?;
        let bh = correct(&p_values, CorrectionMethod::BenjaminiHochberg)?;
        let by = correct(&p_values, CorrectionMethod::BenjaminiYekutieli)?;

        for (i, record) in numeric.into_iter().enumerate() {
            let mut adjusted = AdjustedRecord::unadjusted(record);
            adjusted.p_bonferroni = Some(bonferroni[i]);
            adjusted.p_holm = Some(holm[i]);
            adjusted.p_fdr_bh = Some(bh[i]);
            adjusted.p_fdr_by = Some(by[i]);
            table.push(adjusted);
        }
    }

    table.extend(non_numeric.into_iter().map(AdjustedRecord::unadjusted));

    table.sort_by(|a, b| match (a.p_fdr_bh, b.p_fdr_bh) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    Ok(table)
}
