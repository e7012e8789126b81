//! Dense row-major matrix storage.

/// Row-major dense matrix of 64-bit floats.
///
/// Rows are samples and columns are variables. Storage is contiguous,
/// which keeps row descent during prediction cache-friendly.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    data: Box<[f64]>,
    num_rows: usize,
    num_cols: usize,
}

impl DenseMatrix {
    /// Create a matrix from row-major data, taking ownership.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != num_rows * num_cols`.
    pub fn from_vec(data: Vec<f64>, num_rows: usize, num_cols: usize) -> Self {
        assert_eq!(
            data.len(),
            num_rows * num_cols,
            "Data length {} does not match dimensions {}x{}",
            data.len(),
            num_rows,
            num_cols
        );
        Self {
            data: data.into_boxed_slice(),
            num_rows,
            num_cols,
        }
    }

    /// Create a matrix from a slice of equally sized rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows have unequal lengths.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let num_rows = rows.len();
        let num_cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(num_rows * num_cols);
        for row in rows {
            assert_eq!(row.len(), num_cols, "Rows have unequal lengths");
            data.extend_from_slice(row);
        }
        Self::from_vec(data, num_rows, num_cols)
    }

    /// Number of rows (samples).
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns (variables).
    #[inline]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Value at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.num_rows && col < self.num_cols);
        self.data[row * self.num_cols + col]
    }

    /// A row as a contiguous slice.
    #[inline]
    pub fn row_slice(&self, row: usize) -> &[f64] {
        let start = row * self.num_cols;
        &self.data[start..start + self.num_cols]
    }
}
