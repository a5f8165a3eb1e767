use retrieval_corpus::CorpusError;
use retrieval_vector_store::VectorStoreError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexerError>;

#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Corpus error: {0}")]
    Corpus(CorpusError),

    #[error("Vector store error: {0}")]
    VectorStore(VectorStoreError),

    #[error("No documents found under {}", path.display())]
    EmptyCorpus { path: PathBuf },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Build cancelled")]
    Cancelled,

    #[error("Corpus loader task failed: {0}")]
    Join(String),
}

impl From<CorpusError> for IndexerError {
    fn from(err: CorpusError) -> Self {
        match err {
            CorpusError::Cancelled => Self::Cancelled,
            CorpusError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            other => Self::Corpus(other),
        }
    }
}

impl From<VectorStoreError> for IndexerError {
    fn from(err: VectorStoreError) -> Self {
        match err {
            VectorStoreError::Cancelled => Self::Cancelled,
            VectorStoreError::InvalidConfig(msg) => Self::InvalidConfig(msg),
            other => Self::VectorStore(other),
        }
    }
}

impl From<toml::de::Error> for IndexerError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
