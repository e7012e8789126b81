//! Seeded random number generation for reproducible forests.
//!
//! Every tree owns a private generator derived from the forest seed and
//! the tree index, so grown trees do not depend on which worker thread
//! handles them or in what order.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// The generator used throughout the crate.
pub type ForestRng = Xoshiro256PlusPlus;

/// Generator for forest-level decisions (majority-vote tie-breaks).
pub fn forest_rng(seed: u64) -> ForestRng {
    ForestRng::seed_from_u64(seed)
}

/// Generator for tree `tree_index`, derived from the forest seed.
///
/// The derivation is a pure function of `(forest_seed, tree_index)`, so a
/// tree's randomness is independent of thread scheduling.
pub fn tree_rng(forest_seed: u64, tree_index: usize) -> ForestRng {
    ForestRng::seed_from_u64(forest_seed ^ tree_index as u64)
}

/// Draw `count` values uniformly from `0..upper` with replacement.
pub fn sample_with_replacement(rng: &mut ForestRng, count: usize, upper: usize) -> Vec<usize> {
    (0..count).map(|_| rng.gen_range(0..upper)).collect()
}

/// Draw `k` distinct elements of `universe` via a partial Fisher-Yates
/// shuffle, returned sorted ascending.
///
/// Returns the whole universe when `k >= universe.len()`.
pub fn sample_without_replacement(rng: &mut ForestRng, k: usize, universe: &[usize]) -> Vec<usize> {
    if k >= universe.len() {
        return universe.to_vec();
    }

    let mut indices: Vec<usize> = (0..universe.len()).collect();
    for i in 0..k {
        let j = rng.gen_range(i..universe.len());
        indices.swap(i, j);
    }

    let mut drawn: Vec<usize> = indices[..k].iter().map(|&i| universe[i]).collect();
    drawn.sort_unstable();
    drawn
}

/// Index of the largest count, ties broken uniformly at random.
///
/// Returns `None` when every count is zero. The generator is consulted
/// only when there actually is a tie, and tied indices are enumerated in
/// ascending order, so results are reproducible.
pub fn most_frequent(counts: &[usize], rng: &mut ForestRng) -> Option<usize> {
    let max = *counts.iter().max()?;
    if max == 0 {
        return None;
    }

    let num_tied = counts.iter().filter(|&&c| c == max).count();
    let pick = if num_tied == 1 {
        0
    } else {
        rng.gen_range(0..num_tied)
    };
    counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == max)
        .nth(pick)
        .map(|(i, _)| i)
}
