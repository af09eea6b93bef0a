//! Network error types.

use thiserror::Error;

/// Errors raised while building or training a [`Network`](crate::Network).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Batch size mismatch: {inputs} inputs but {targets} targets")]
    BatchSizeMismatch { inputs: usize, targets: usize },

    #[error("Invalid topology: {message}")]
    InvalidTopology { message: String },

    #[error("Invalid dropout rate {rate} for hidden layer {layer}: must lie in [0, 1]")]
    InvalidDropoutRate { layer: usize, rate: f64 },

    #[error("Invalid learning rate {0}: must be finite and positive")]
    InvalidLearningRate(f64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetworkError {
    pub(crate) fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        NetworkError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NetworkError>;
