//! Error types for the LSTM engine

use thiserror::Error;

/// Result type for LSTM operations
pub type LstmResult<T> = Result<T, LstmError>;

/// Errors that can occur while building, running or differentiating the network
#[derive(Debug, Error)]
pub enum LstmError {
    #[error("Shape mismatch in {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("Dimension mismatch in {what}: expected {expected}, got {got}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid dropout count: cannot drop {requested} of {n_hid} hidden units")]
    InvalidDropoutCount { requested: usize, n_hid: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failure reported by a [`LossStrategy`](crate::api::loss::LossStrategy)
    /// implementation outside this crate. Returned to the caller unchanged.
    #[error("Loss error: {0}")]
    Loss(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LstmError {
    pub(crate) fn shape(what: impl Into<String>, expected: usize, got: usize) -> Self {
        LstmError::ShapeMismatch {
            what: what.into(),
            expected,
            got,
        }
    }

    pub(crate) fn dimension(what: impl Into<String>, expected: usize, got: usize) -> Self {
        LstmError::DimensionMismatch {
            what: what.into(),
            expected,
            got,
        }
    }
}
