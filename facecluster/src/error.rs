use thiserror::Error;

use crate::person::PersonId;

/// Errors returned by facecluster operations.
#[derive(Debug, Error)]
pub enum FaceClusterError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid embedding: {0}")]
    InvalidEmbedding(String),

    #[error("invalid observation: {0}")]
    InvalidObservation(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("person not found: {0}")]
    PersonNotFound(PersonId),

    #[error("person ids exhausted")]
    IdsExhausted,

    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("embedding provider: {0}")]
    Provider(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl FaceClusterError {
    /// Reports whether the error rejected a single malformed input and left
    /// all state untouched.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. }
                | Self::InvalidEmbedding(_)
                | Self::InvalidObservation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FaceClusterError>;
