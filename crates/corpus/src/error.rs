use std::path::PathBuf;
use thiserror::Error;

/// Result type for corpus operations
pub type Result<T> = std::result::Result<T, CorpusError>;

/// Errors that abort a corpus load.
///
/// Per-line and per-file failures are not represented here: they are counted
/// in the [`crate::LoadReport`] and the load continues.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corpus path does not exist: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Invalid loader configuration: {0}")]
    InvalidConfig(String),

    #[error("Corpus load cancelled")]
    Cancelled,
}

/// Why a single input line was rejected.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record is not a JSON object")]
    NotAnObject,

    #[error("Record has no usable title")]
    MissingTitle,

    #[error("Record id must be a string or a number")]
    InvalidId,
}
