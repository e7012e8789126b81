//! Shared error types for forest training and persistence.

use std::io;

use thiserror::Error;

/// Errors surfaced by dataset construction, training, and persistence.
#[derive(Debug, Error)]
pub enum ForestError {
    /// Configuration rejected before any tree is grown.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A loaded blob does not contain a classification forest.
    #[error("wrong tree type: expected tag {expected}, got tag {got}")]
    WrongTreeType { expected: u32, got: u32 },

    /// A serialization source or sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
