//! # Retrieval Vector Store
//!
//! Embedding, exact vector search and persistence for dense retrieval.
//!
//! ## Architecture
//!
//! ```text
//! texts[]
//!     │
//!     ├──> EmbeddingBatcher (fixed-size chunks)
//!     │      └─> Embedder ──> Array2<f32> [n, d]
//!     │
//!     ├──> FlatIndex
//!     │      └─> exact k-NN, squared L2
//!     │
//!     ├──> ArtifactStore
//!     │      └─> index .bin + ids .json + embeddings .npy
//!     │
//!     └──> QueryService
//!            └─> (id, distance) hits
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use retrieval_vector_store::{EmbeddingBatcher, FlatIndex, QueryService, StubEmbedder};
//!
//! #[tokio::main]
//! async fn main() -> retrieval_vector_store::Result<()> {
//!     let embedder = StubEmbedder::new(384)?;
//!     let texts = vec!["Edison patented the light bulb.".to_string()];
//!     let ids = vec!["Thomas Edison".to_string()];
//!
//!     let matrix = EmbeddingBatcher::default().embed_all(&texts, &embedder).await?;
//!     let index = FlatIndex::build(matrix);
//!
//!     let service = QueryService::new(&index, &ids)?;
//!     for hit in service.search_text("Who invented the light bulb?", &embedder, 5).await? {
//!         println!("{}: {:.4}", hit.id, hit.distance);
//!     }
//!     Ok(())
//! }
//! ```

mod artifacts;
mod batcher;
mod embeddings;
mod error;
mod flat_index;
mod paths;
mod query;
mod store;
mod types;

pub use artifacts::{decode_index, encode_index, ArtifactBundle, ArtifactStore};
pub use batcher::{EmbeddingBatcher, DEFAULT_CHUNK_SIZE};
pub use embeddings::{Embedder, FnEmbedder, StubEmbedder, DEFAULT_STUB_DIMENSION};
pub use error::{Result, VectorStoreError};
pub use flat_index::FlatIndex;
pub use paths::{
    backup_path, staging_path, ArtifactLayout, EMBEDDINGS_FILE_NAME, IDS_FILE_NAME,
    INDEX_FILE_NAME,
};
pub use query::{search_text, QueryService};
pub use store::RetrievalStore;
pub use types::{KnnResult, Neighbor, QueryHit};

pub use tokio_util::sync::CancellationToken;
