//! Permutation null distributions for the area score.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::enrichment::area::area_score;
use crate::enrichment::backend::ArrayBackend;

pub const DEFAULT_PERMUTATIONS: usize = 1000;
pub const DEFAULT_SEED: u64 = 42;

/// Score `permutations` random reorderings of `indicators`.
///
/// One generator is seeded with `seed` and advanced through every permutation. The
/// indicators enter it in sorted order, so the output depends only on the multiset
/// of values, the permutation count and the seed.
pub fn null_distribution(
    backend: &dyn ArrayBackend,
    indicators: &[f64],
    permutations: usize,
    seed: u64,
) -> anyhow::Result<Vec<f64>> {
    let mut canonical = indicators.to_vec();
    canonical.sort_by(|a, b| a.total_cmp(b));

    let mut rng = StdRng::seed_from_u64(seed);
    let mut scores = Vec::with_capacity(permutations);
    let mut shuffled = canonical.clone();

    for _ in 0..permutations {
        shuffled.copy_from_slice(&canonical);
        shuffled.shuffle(&mut rng);
        scores.push(area_score(backend, &shuffled)?.score);
    }

    Ok(scores)
}
