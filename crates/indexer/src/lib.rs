//! # Retrieval Indexer
//!
//! Builds the persisted artifacts of a dense-retrieval corpus.
//!
//! ## Pipeline
//!
//! ```text
//! Corpus path
//!     │
//!     ├──> CorpusLoader (file | dump | .bz2 shards)
//!     │      └─> (id, title, text) documents
//!     │
//!     ├──> EmbeddingBatcher (chunk_size texts per call)
//!     │      └─> [n, d] matrix
//!     │
//!     ├──> FlatIndex
//!     │
//!     └──> ArtifactStore
//!            └─> index + ids + embeddings
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use retrieval_indexer::{BuildConfig, RetrievalIndexer};
//! use retrieval_vector_store::StubEmbedder;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BuildConfig::default().apply_env()?;
//!     let indexer = RetrievalIndexer::new(config, Arc::new(StubEmbedder::new(384)?))?;
//!     let stats = indexer.build("data/enwiki", "artifacts").await?;
//!
//!     println!("Indexed {} documents in {} chunks", stats.documents, stats.chunks);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod indexer;
mod stats;

pub use config::{BuildConfig, ENV_ARTIFACT_PREFIX, ENV_CHUNK_SIZE};
pub use error::{IndexerError, Result};
pub use indexer::RetrievalIndexer;
pub use stats::BuildStats;
