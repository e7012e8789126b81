//! In-memory numeric data access.

mod dataset;
mod dense;

pub use dataset::Dataset;
pub use dense::DenseMatrix;
