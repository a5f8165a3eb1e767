use crate::artifacts::{ArtifactBundle, ArtifactStore};
use crate::embeddings::Embedder;
use crate::error::Result;
use crate::flat_index::FlatIndex;
use crate::query::QueryService;
use crate::types::QueryHit;
use ndarray::ArrayView2;
use std::path::Path;

/// A loaded artifact bundle ready to answer queries.
pub struct RetrievalStore {
    bundle: ArtifactBundle,
}

impl RetrievalStore {
    /// Load store from an artifact directory with the default layout
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load(&ArtifactStore::new(dir)).await
    }

    pub async fn load(artifacts: &ArtifactStore) -> Result<Self> {
        let bundle = artifacts.load().await?;
        // Validates id alignment once so searches cannot fail on it later
        QueryService::new(&bundle.index, &bundle.ids)?;
        Ok(Self { bundle })
    }

    /// Search for the documents nearest to `query`
    pub async fn search(
        &self,
        query: &str,
        embedder: &dyn Embedder,
        k: usize,
    ) -> Result<Vec<QueryHit>> {
        self.service()?.search_text(query, embedder, k).await
    }

    pub fn search_vector(&self, vector: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        self.service()?.search_vector(vector, k)
    }

    fn service(&self) -> Result<QueryService<'_>> {
        QueryService::new(&self.bundle.index, &self.bundle.ids)
    }

    pub fn index(&self) -> &FlatIndex {
        &self.bundle.index
    }

    pub fn ids(&self) -> &[String] {
        &self.bundle.ids
    }

    pub fn embeddings(&self) -> ArrayView2<'_, f32> {
        self.bundle.embeddings.view()
    }

    /// Get total number of indexed documents
    pub fn len(&self) -> usize {
        self.bundle.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundle.ids.is_empty()
    }

    pub fn into_bundle(self) -> ArtifactBundle {
        self.bundle
    }
}
