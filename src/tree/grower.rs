//! Work-queue tree growth.

use crate::data::Dataset;
use crate::importance::GiniImportance;
use crate::random::{self, ForestRng};
use crate::splitter::GiniSplitter;

use super::Tree;

/// Per-tree growth parameters, fixed for the whole forest.
#[derive(Debug, Clone, Copy)]
pub struct GrowParams<'a> {
    /// Variables eligible for splitting, sorted ascending.
    pub split_candidates: &'a [usize],
    /// Candidate variables drawn per node.
    pub mtry: usize,
    /// Nodes at or below this sample count become leaves.
    pub min_node_size: usize,
}

/// Grows one classification tree at a time.
///
/// The grower owns the splitter and a class-count buffer so scratch space
/// is reused across all nodes of all trees it grows.
pub struct TreeGrower<'a> {
    dataset: &'a Dataset,
    params: GrowParams<'a>,
    splitter: GiniSplitter,
    class_counts: Vec<usize>,
}

impl<'a> TreeGrower<'a> {
    pub fn new(dataset: &'a Dataset, params: GrowParams<'a>) -> Self {
        let num_classes = dataset.num_classes();
        Self {
            dataset,
            params,
            splitter: GiniSplitter::new(num_classes),
            class_counts: vec![0; num_classes],
        }
    }

    /// Grow a tree on `in_bag`, a bootstrap multiset of sample IDs.
    ///
    /// Nodes are processed in ID order: splitting a node appends its two
    /// children to the queue, so the loop ends once every node has been
    /// split or finalized as a leaf. When `importance` is given, every
    /// successful split adds its Gini decrease to the accumulator.
    pub fn grow(
        &mut self,
        in_bag: Vec<usize>,
        rng: &mut ForestRng,
        mut importance: Option<&mut GiniImportance>,
    ) -> Tree {
        let mut tree = Tree::with_root();
        let mut node_samples: Vec<Vec<usize>> = vec![in_bag];

        let mut node = 0;
        while node < tree.num_nodes() {
            self.split_node(&mut tree, &mut node_samples, node, rng, importance.as_deref_mut());
            node += 1;
        }
        tree
    }

    fn split_node(
        &mut self,
        tree: &mut Tree,
        node_samples: &mut Vec<Vec<usize>>,
        node: usize,
        rng: &mut ForestRng,
        importance: Option<&mut GiniImportance>,
    ) {
        let candidates =
            random::sample_without_replacement(rng, self.params.mtry, self.params.split_candidates);

        // Stop on minimum node size.
        if node_samples[node].len() <= self.params.min_node_size {
            let value = self.estimate_leaf(&node_samples[node], rng);
            tree.set_leaf(node, value);
            node_samples[node] = Vec::new();
            return;
        }

        // Stop on a pure node: its value is the shared response.
        let first_class = self.dataset.response_class_id(node_samples[node][0]);
        if node_samples[node]
            .iter()
            .all(|&s| self.dataset.response_class_id(s) == first_class)
        {
            tree.set_leaf(node, self.dataset.class_values()[first_class]);
            node_samples[node] = Vec::new();
            return;
        }

        let best = self
            .splitter
            .find_best_split(self.dataset, &node_samples[node], &candidates);
        let Some(split) = best else {
            // No candidate produced a valid partition; recover as a leaf.
            let value = self.estimate_leaf(&node_samples[node], rng);
            tree.set_leaf(node, value);
            node_samples[node] = Vec::new();
            return;
        };

        if let Some(accumulator) = importance {
            let samples = &node_samples[node];
            self.class_counts.fill(0);
            for &s in samples {
                self.class_counts[self.dataset.response_class_id(s)] += 1;
            }
            let sum_node: f64 = self
                .class_counts
                .iter()
                .map(|&c| {
                    let c = c as f64;
                    c * c
                })
                .sum();
            accumulator.record(split.var_id, split.decrease, sum_node, samples.len());
        }

        // Partition the node's samples between the two new children; the
        // parent's list is released.
        let samples = std::mem::take(&mut node_samples[node]);
        let mut left_samples = Vec::new();
        let mut right_samples = Vec::new();
        for &s in &samples {
            if self.dataset.get(s, split.var_id) <= split.value {
                left_samples.push(s);
            } else {
                right_samples.push(s);
            }
        }
        debug_assert!(!left_samples.is_empty() && !right_samples.is_empty());

        let left = tree.push_empty_node();
        node_samples.push(left_samples);
        let right = tree.push_empty_node();
        node_samples.push(right_samples);
        tree.set_split(node, split.var_id, split.value, left, right);
    }

    /// Majority class value among `samples`, ties broken via `rng`.
    fn estimate_leaf(&mut self, samples: &[usize], rng: &mut ForestRng) -> f64 {
        self.class_counts.fill(0);
        for &s in samples {
            self.class_counts[self.dataset.response_class_id(s)] += 1;
        }
        let class_id =
            random::most_frequent(&self.class_counts, rng).expect("leaf estimate on empty node");
        self.dataset.class_values()[class_id]
    }
}
