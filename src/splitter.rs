//! Gini-criterion split search.
//!
//! The inner loop of tree growth: given a node's samples and a drawn set
//! of candidate variables, find the (variable, threshold) pair maximizing
//! the decrease of Gini impurity.

use crate::data::Dataset;

/// A chosen split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestSplit {
    /// Variable to split on.
    pub var_id: usize,
    /// Threshold; samples with `value <= threshold` route left.
    pub value: f64,
    /// The score `Σ L_k²/|L| + Σ R_k²/|R|`, monotone in the Gini impurity
    /// decrease of the partition.
    pub decrease: f64,
}

/// Split finder with scratch space reused across nodes.
///
/// The class-count buffers are sized to the class count once per tree and
/// zeroed in place for every candidate threshold, keeping the hot loop
/// free of allocation.
#[derive(Debug)]
pub struct GiniSplitter {
    counts_left: Vec<usize>,
    counts_right: Vec<usize>,
    candidate_values: Vec<f64>,
}

impl GiniSplitter {
    pub fn new(num_classes: usize) -> Self {
        Self {
            counts_left: vec![0; num_classes],
            counts_right: vec![0; num_classes],
            candidate_values: Vec::new(),
        }
    }

    /// Find the best split of `sample_ids` over `candidate_vars`.
    ///
    /// Candidates are scanned in order and an incumbent is replaced only on
    /// a strictly larger score, so the first-seen pair wins ties. Returns
    /// `None` when no candidate yields a two-way partition with both sides
    /// non-empty; the caller then finalizes the node as a leaf.
    pub fn find_best_split(
        &mut self,
        dataset: &Dataset,
        sample_ids: &[usize],
        candidate_vars: &[usize],
    ) -> Option<BestSplit> {
        let mut best: Option<BestSplit> = None;

        for &var_id in candidate_vars {
            dataset.fill_unique_values(var_id, sample_ids, &mut self.candidate_values);

            // All samples agree on this variable: nothing to split.
            if self.candidate_values.len() < 2 {
                continue;
            }

            for threshold_index in 0..self.candidate_values.len() {
                let threshold = self.candidate_values[threshold_index];

                self.counts_left.fill(0);
                self.counts_right.fill(0);
                let mut num_left = 0usize;
                let mut num_right = 0usize;

                for &sample_id in sample_ids {
                    let class_id = dataset.response_class_id(sample_id);
                    if dataset.get(sample_id, var_id) <= threshold {
                        num_left += 1;
                        self.counts_left[class_id] += 1;
                    } else {
                        num_right += 1;
                        self.counts_right[class_id] += 1;
                    }
                }

                // The largest candidate puts every sample left.
                if num_left == 0 || num_right == 0 {
                    continue;
                }

                let sum_left: f64 = self
                    .counts_left
                    .iter()
                    .map(|&c| {
                        let c = c as f64;
                        c * c
                    })
                    .sum();
                let sum_right: f64 = self
                    .counts_right
                    .iter()
                    .map(|&c| {
                        let c = c as f64;
                        c * c
                    })
                    .sum();
                let decrease = sum_left / num_left as f64 + sum_right / num_right as f64;

                if best.map_or(true, |b| decrease > b.decrease) {
                    best = Some(BestSplit {
                        var_id,
                        value: threshold,
                        decrease,
                    });
                }
            }
        }

        best
    }
}
