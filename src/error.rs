//! Crate error type

use thiserror::Error;

/// Errors raised while building networks or running epochs.
#[derive(Debug, Error)]
pub enum Error {
    /// `EpochRunner::run` was called without a performance function.
    #[error("missing performance function")]
    MissingPerformanceFn,

    /// Training mode was requested without an optimizer.
    #[error("missing optimizer")]
    MissingOptimizer,

    /// Running metrics were weighted against an epoch of zero items.
    #[error("cannot weight metrics against an empty epoch")]
    EmptyEpoch,

    #[error("shape mismatch in {context}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        context: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    #[error("dropout rate must be in [0, 1), got {0}")]
    InvalidDropout(f64),

    #[error("device transfer failed: {0}")]
    Device(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for epoch-runner operations
pub type Result<T> = std::result::Result<T, Error>;
