//! Forest model, training, and out-of-bag evaluation.

mod evaluate;
mod trainer;

pub use evaluate::{ConfusionMatrix, OobEvaluation, TreeOobPredictions};
pub use trainer::{ForestFit, ForestTrainer, ForestTrainerBuilder};

use crate::data::DenseMatrix;
use crate::random;
use crate::tree::Tree;

/// A trained classification forest.
///
/// Read-only after growth: the trees, the class table, and the seed fully
/// determine every prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    class_values: Vec<f64>,
    num_variables: usize,
    dependent_var_id: usize,
    seed: u64,
}

impl Forest {
    pub(crate) fn new(
        trees: Vec<Tree>,
        class_values: Vec<f64>,
        num_variables: usize,
        dependent_var_id: usize,
        seed: u64,
    ) -> Self {
        Self {
            trees,
            class_values,
            num_variables,
            dependent_var_id,
            seed,
        }
    }

    /// Number of trees.
    #[inline]
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// The grown trees, in tree-index order.
    #[inline]
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Distinct response values in first-seen training order.
    #[inline]
    pub fn class_values(&self) -> &[f64] {
        &self.class_values
    }

    /// Variable count of the dataset the forest was grown on.
    #[inline]
    pub fn num_variables(&self) -> usize {
        self.num_variables
    }

    /// Index of the response column.
    #[inline]
    pub fn dependent_var_id(&self) -> usize {
        self.dependent_var_id
    }

    /// Seed the forest was grown with.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Compact ID of a class value within the class table.
    pub(crate) fn class_id_of(&self, value: f64) -> Option<usize> {
        self.class_values.iter().position(|&c| c == value)
    }

    /// Majority-vote predictions for every row of `data`.
    ///
    /// Vote ties are broken uniformly at random by a generator re-seeded
    /// from the forest seed on every call, so repeated calls and
    /// save/load round-trips produce identical output.
    ///
    /// # Panics
    ///
    /// Panics on an empty forest or when a tree predicts a value outside
    /// the class table (a malformed hand-built forest).
    pub fn predict(&self, data: &DenseMatrix) -> Vec<f64> {
        let mut rng = random::forest_rng(self.seed);
        let mut votes = vec![0usize; self.class_values.len()];
        let mut predictions = Vec::with_capacity(data.num_rows());

        for row in 0..data.num_rows() {
            votes.fill(0);
            for tree in &self.trees {
                let value = tree.predict(data, row);
                if let Some(class_id) = self.class_id_of(value) {
                    votes[class_id] += 1;
                }
            }
            let winner =
                random::most_frequent(&votes, &mut rng).expect("no votes cast for a row");
            predictions.push(self.class_values[winner]);
        }
        predictions
    }
}
