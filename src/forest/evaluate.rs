//! Out-of-bag evaluation: per-sample votes, error, and confusion counts.

use crate::data::Dataset;
use crate::random::{self, ForestRng};

/// One tree's predictions for its out-of-bag samples.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeOobPredictions {
    /// The tree's OOB sample IDs, sorted ascending.
    pub sample_ids: Vec<usize>,
    /// Predicted class value per OOB sample, parallel to `sample_ids`.
    pub predicted: Vec<f64>,
}

impl TreeOobPredictions {
    /// Fraction of this tree's OOB samples it classifies correctly, or
    /// `None` when the tree has no OOB samples.
    pub fn accuracy(&self, dataset: &Dataset) -> Option<f64> {
        if self.sample_ids.is_empty() {
            return None;
        }
        let correct = self
            .sample_ids
            .iter()
            .zip(&self.predicted)
            .filter(|&(&sample_id, &predicted)| {
                predicted == dataset.get(sample_id, dataset.dependent_var_id())
            })
            .count();
        Some(correct as f64 / self.sample_ids.len() as f64)
    }
}

/// Dense K×K confusion counts over the defined OOB predictions, keyed
/// `(true class, predicted class)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    class_values: Vec<f64>,
    counts: Vec<usize>,
}

impl ConfusionMatrix {
    pub(crate) fn new(class_values: Vec<f64>) -> Self {
        let num_classes = class_values.len();
        Self {
            class_values,
            counts: vec![0; num_classes * num_classes],
        }
    }

    /// Number of classes.
    #[inline]
    pub fn num_classes(&self) -> usize {
        self.class_values.len()
    }

    /// The class values labeling rows and columns.
    #[inline]
    pub fn class_values(&self) -> &[f64] {
        &self.class_values
    }

    /// Count of samples of true class `true_id` predicted as `predicted_id`.
    #[inline]
    pub fn count(&self, true_id: usize, predicted_id: usize) -> usize {
        self.counts[true_id * self.num_classes() + predicted_id]
    }

    pub(crate) fn record(&mut self, true_id: usize, predicted_id: usize) {
        let num_classes = self.num_classes();
        self.counts[true_id * num_classes + predicted_id] += 1;
    }

    /// Sum of the diagonal: correctly classified samples.
    pub fn num_correct(&self) -> usize {
        (0..self.num_classes()).map(|k| self.count(k, k)).sum()
    }

    /// Total counted samples.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Result of OOB evaluation over the training set.
#[derive(Debug, Clone, PartialEq)]
pub struct OobEvaluation {
    /// Per-sample OOB majority vote; `None` for samples that were in-bag
    /// in every single tree, which are excluded from all metrics.
    pub predictions: Vec<Option<f64>>,
    /// Misclassified defined samples over defined samples (0 when no
    /// sample is defined).
    pub overall_error: f64,
    /// Confusion counts over the defined samples.
    pub confusion: ConfusionMatrix,
    /// Number of samples with at least one OOB vote.
    pub num_defined: usize,
}

/// Tally per-tree OOB predictions into per-sample votes and majority-vote
/// each sample. Only trees that held a sample out contribute to its vote.
pub(crate) fn evaluate_oob(
    dataset: &Dataset,
    per_tree: &[TreeOobPredictions],
    rng: &mut ForestRng,
) -> OobEvaluation {
    let num_samples = dataset.num_samples();
    let num_classes = dataset.num_classes();

    let mut votes = vec![0usize; num_samples * num_classes];
    for tree_oob in per_tree {
        for (&sample_id, &value) in tree_oob.sample_ids.iter().zip(&tree_oob.predicted) {
            if let Some(class_id) = dataset.class_values().iter().position(|&c| c == value) {
                votes[sample_id * num_classes + class_id] += 1;
            }
        }
    }

    let mut predictions = Vec::with_capacity(num_samples);
    let mut confusion = ConfusionMatrix::new(dataset.class_values().to_vec());
    let mut num_defined = 0usize;
    let mut num_misclassified = 0usize;

    for sample_id in 0..num_samples {
        let counts = &votes[sample_id * num_classes..(sample_id + 1) * num_classes];
        match random::most_frequent(counts, rng) {
            Some(class_id) => {
                num_defined += 1;
                let true_id = dataset.response_class_id(sample_id);
                if class_id != true_id {
                    num_misclassified += 1;
                }
                confusion.record(true_id, class_id);
                predictions.push(Some(dataset.class_values()[class_id]));
            }
            None => predictions.push(None),
        }
    }

    let overall_error = if num_defined == 0 {
        0.0
    } else {
        num_misclassified as f64 / num_defined as f64
    };

    OobEvaluation {
        predictions,
        overall_error,
        confusion,
        num_defined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DenseMatrix;
    use crate::random::forest_rng;
    use approx::assert_relative_eq;

    fn dataset() -> Dataset {
        // Classes 0.0 (rows 0, 1) and 1.0 (rows 2, 3).
        let matrix = DenseMatrix::from_rows(&[
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 1.0],
            vec![4.0, 1.0],
        ]);
        Dataset::new(matrix, 1).unwrap()
    }

    #[test]
    fn votes_come_only_from_oob_trees() {
        let dataset = dataset();
        let per_tree = vec![
            TreeOobPredictions {
                sample_ids: vec![0, 2],
                predicted: vec![0.0, 1.0],
            },
            TreeOobPredictions {
                sample_ids: vec![0, 3],
                predicted: vec![1.0, 1.0],
            },
        ];
        let mut rng = forest_rng(42);
        let evaluation = evaluate_oob(&dataset, &per_tree, &mut rng);

        // Sample 1 was in-bag everywhere: undefined.
        assert_eq!(evaluation.predictions[1], None);
        assert_eq!(evaluation.num_defined, 3);
        // Samples 2 and 3 get unanimous correct votes.
        assert_eq!(evaluation.predictions[2], Some(1.0));
        assert_eq!(evaluation.predictions[3], Some(1.0));
        // Sample 0 is a 1-1 tie between 0.0 and 1.0, broken by the RNG.
        let tied = evaluation.predictions[0].unwrap();
        assert!(tied == 0.0 || tied == 1.0);
    }

    #[test]
    fn error_counts_only_defined_samples() {
        let dataset = dataset();
        let per_tree = vec![TreeOobPredictions {
            sample_ids: vec![0, 2],
            predicted: vec![1.0, 1.0],
        }];
        let mut rng = forest_rng(42);
        let evaluation = evaluate_oob(&dataset, &per_tree, &mut rng);

        // Sample 0 misclassified, sample 2 correct, samples 1 and 3 undefined.
        assert_eq!(evaluation.num_defined, 2);
        assert_relative_eq!(evaluation.overall_error, 0.5);
        assert_eq!(evaluation.confusion.total(), 2);
        assert_eq!(evaluation.confusion.num_correct(), 1);
        assert_eq!(evaluation.confusion.count(0, 1), 1);
        assert_eq!(evaluation.confusion.count(1, 1), 1);
    }

    #[test]
    fn no_votes_at_all() {
        let dataset = dataset();
        let mut rng = forest_rng(42);
        let evaluation = evaluate_oob(&dataset, &[], &mut rng);

        assert!(evaluation.predictions.iter().all(Option::is_none));
        assert_eq!(evaluation.num_defined, 0);
        assert_relative_eq!(evaluation.overall_error, 0.0);
    }

    #[test]
    fn per_tree_accuracy() {
        let dataset = dataset();
        let oob = TreeOobPredictions {
            sample_ids: vec![0, 2, 3],
            predicted: vec![0.0, 0.0, 1.0],
        };

        assert_relative_eq!(oob.accuracy(&dataset).unwrap(), 2.0 / 3.0);
        assert_eq!(
            TreeOobPredictions {
                sample_ids: vec![],
                predicted: vec![]
            }
            .accuracy(&dataset),
            None
        );
    }
}
