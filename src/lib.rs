//! canopy: a random forest classification library.
//!
//! This crate trains ensembles of Gini-impurity decision trees on bootstrap
//! resamples of an in-memory numeric matrix, predicts class labels by
//! majority vote, and reports out-of-bag error, a confusion matrix, and
//! Gini variable importance.
//!
//! Training is reproducible: for a fixed dataset, seed, and configuration
//! every run produces identical results. Trees, predictions, and OOB
//! statistics are also independent of the worker thread count; Gini
//! importance is summed per worker, so across different thread counts it
//! agrees up to floating-point summation order.

pub mod data;
pub mod error;
pub mod forest;
pub mod importance;
pub mod io;
pub mod logging;
pub mod parallel;
pub mod random;
pub mod sampling;
pub mod splitter;
pub mod tree;

pub use data::{Dataset, DenseMatrix};
pub use error::ForestError;
pub use forest::{ConfusionMatrix, Forest, ForestFit, ForestTrainer, OobEvaluation};
pub use importance::ImportanceMode;
pub use logging::{LogSink, Verbosity};
