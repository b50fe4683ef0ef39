//! Error taxonomy shared by every stage of the pipeline.
//!
//! "No relevant context" is deliberately absent: an empty search result is a
//! well-defined outcome, not a fault, and is modeled on the success path.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("generation exceeded the {budget_secs}s wall-clock budget")]
    GenerationTimeout { budget_secs: u64 },

    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),

    #[error("storage read failed: {0}")]
    StorageReadFailed(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Short, stable classification string used in user-visible failure
    /// payloads. Callers that retry behave differently per class, so these
    /// must stay distinct (a timeout is not a storage fault).
    pub fn classification(&self) -> &'static str {
        match self {
            Error::ModelUnavailable(_) => "model_unavailable",
            Error::GenerationTimeout { .. } => "generation_timeout",
            Error::StorageWriteFailed(_) => "storage_write_failed",
            Error::StorageReadFailed(_) => "storage_read_failed",
            Error::DimensionMismatch { .. } => "dimension_mismatch",
            Error::Validation(_) => "validation_error",
            Error::InvalidConfig(_) => "invalid_config",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Structured failure payload returned over the service boundaries.
/// Carries a short classification plus a human-readable detail string and
/// nothing else: no backtraces, no internal identifiers.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}

impl From<&Error> for ErrorBody {
    fn from(err: &Error) -> Self {
        Self { error: err.classification().to_string(), details: err.to_string() }
    }
}
