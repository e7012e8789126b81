//! Bootstrap resampling with out-of-bag bookkeeping.

use fixedbitset::FixedBitSet;

use crate::random::{self, ForestRng};

/// One tree's bootstrap draw.
///
/// `in_bag` is a multiset: duplicate sample IDs are preserved, so a
/// sample's weight at the tree root equals its multiplicity. `oob` holds
/// the complement, sorted ascending.
#[derive(Debug, Clone)]
pub struct BootstrapSample {
    /// The drawn sample IDs, `num_samples` of them, duplicates included.
    pub in_bag: Vec<usize>,
    /// Sample IDs never drawn, sorted ascending.
    pub oob: Vec<usize>,
}

/// Draw `num_samples` indices with replacement and record the complement.
pub fn bootstrap(num_samples: usize, rng: &mut ForestRng) -> BootstrapSample {
    let in_bag = random::sample_with_replacement(rng, num_samples, num_samples);

    let mut drawn = FixedBitSet::with_capacity(num_samples);
    for &id in &in_bag {
        drawn.insert(id);
    }
    let oob = (0..num_samples).filter(|&id| !drawn.contains(id)).collect();

    BootstrapSample { in_bag, oob }
}
