use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Embedding dimension changed in chunk {chunk}: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        chunk: usize,
    },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Index error: {0}")]
    IndexError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Inconsistent artifact set: {0}")]
    InconsistentArtifacts(String),

    #[error("Missing artifact: {}", path.display())]
    ArtifactMissing { path: PathBuf },

    #[error("Malformed artifact {}: {reason}", path.display())]
    ArtifactFormat { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Operation cancelled")]
    Cancelled,
}

impl VectorStoreError {
    pub(crate) fn format(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::ArtifactFormat {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
