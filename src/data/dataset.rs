//! Training dataset: a matrix plus its designated response column.

use crate::data::DenseMatrix;
use crate::error::ForestError;

/// An immutable dataset with one column marked as the response.
///
/// Construction scans the response column once to build the class table:
/// the distinct response values in first-seen row order, and for every row
/// the compact ID of its class within that table. The table order is part
/// of the model (class IDs index vote counters and the confusion matrix),
/// so it must not change after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    matrix: DenseMatrix,
    dependent_var_id: usize,
    class_values: Vec<f64>,
    response_class_ids: Vec<usize>,
}

impl Dataset {
    /// Wrap `matrix` with `dependent_var_id` as the response column.
    ///
    /// Fails with [`ForestError::InvalidConfig`] when the matrix is empty
    /// or the response column does not exist.
    pub fn new(matrix: DenseMatrix, dependent_var_id: usize) -> Result<Self, ForestError> {
        if matrix.num_rows() == 0 || matrix.num_cols() == 0 {
            return Err(ForestError::InvalidConfig("empty dataset".to_string()));
        }
        if dependent_var_id >= matrix.num_cols() {
            return Err(ForestError::InvalidConfig(format!(
                "dependent variable {} out of range for {} columns",
                dependent_var_id,
                matrix.num_cols()
            )));
        }

        let mut class_values: Vec<f64> = Vec::new();
        let mut response_class_ids = Vec::with_capacity(matrix.num_rows());
        for row in 0..matrix.num_rows() {
            let value = matrix.get(row, dependent_var_id);
            let class_id = match class_values.iter().position(|&c| c == value) {
                Some(id) => id,
                None => {
                    class_values.push(value);
                    class_values.len() - 1
                }
            };
            response_class_ids.push(class_id);
        }

        Ok(Self {
            matrix,
            dependent_var_id,
            class_values,
            response_class_ids,
        })
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.matrix.get(row, col)
    }

    /// Number of samples (rows).
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.matrix.num_rows()
    }

    /// Number of variables (columns), response included.
    #[inline]
    pub fn num_variables(&self) -> usize {
        self.matrix.num_cols()
    }

    /// Index of the response column.
    #[inline]
    pub fn dependent_var_id(&self) -> usize {
        self.dependent_var_id
    }

    /// Distinct response values in first-seen row order.
    #[inline]
    pub fn class_values(&self) -> &[f64] {
        &self.class_values
    }

    /// Number of distinct response values.
    #[inline]
    pub fn num_classes(&self) -> usize {
        self.class_values.len()
    }

    /// Class ID of `row`'s response value.
    #[inline]
    pub fn response_class_id(&self, row: usize) -> usize {
        self.response_class_ids[row]
    }

    /// The underlying matrix.
    #[inline]
    pub fn matrix(&self) -> &DenseMatrix {
        &self.matrix
    }

    /// Collect the sorted distinct values of `col` over `sample_ids` into
    /// `out`, clearing it first.
    ///
    /// The result is the candidate-threshold set for a split on `col`; the
    /// caller owns the buffer so the allocation is reused across nodes.
    pub fn fill_unique_values(&self, col: usize, sample_ids: &[usize], out: &mut Vec<f64>) {
        out.clear();
        out.extend(sample_ids.iter().map(|&s| self.get(s, col)));
        out.sort_unstable_by(f64::total_cmp);
        out.dedup();
    }
}
