use crate::embeddings::Embedder;
use crate::error::{Result, VectorStoreError};
use crate::flat_index::FlatIndex;
use crate::types::{Neighbor, QueryHit};

/// Answers free-text queries against an index and its aligned id list.
#[derive(Debug, Clone, Copy)]
pub struct QueryService<'a> {
    index: &'a FlatIndex,
    ids: &'a [String],
}

impl<'a> QueryService<'a> {
    pub fn new(index: &'a FlatIndex, ids: &'a [String]) -> Result<Self> {
        if ids.len() != index.ntotal() {
            return Err(VectorStoreError::InconsistentArtifacts(format!(
                "{} ids for {} indexed vectors",
                ids.len(),
                index.ntotal()
            )));
        }
        Ok(Self { index, ids })
    }

    /// Embed `query` and return up to `k` hits, nearest first
    pub async fn search_text(
        &self,
        query: &str,
        embedder: &dyn Embedder,
        k: usize,
    ) -> Result<Vec<QueryHit>> {
        log::debug!("Searching for: '{}' (k: {})", query, k);
        let vector = embedder.embed(query).await?;
        self.search_vector(&vector, k)
    }

    /// Search with an already embedded query
    pub fn search_vector(&self, vector: &[f32], k: usize) -> Result<Vec<QueryHit>> {
        let neighbors = self.index.search_one(vector, k)?;
        let hits = self.resolve(&neighbors);
        log::debug!("Found {} results", hits.len());
        Ok(hits)
    }

    fn resolve(&self, neighbors: &[Neighbor]) -> Vec<QueryHit> {
        neighbors
            .iter()
            .filter_map(|n| {
                let Some(id) = self.ids.get(n.position) else {
                    log::warn!("Position {} out of bounds for {} ids", n.position, self.ids.len());
                    return None;
                };
                Some(QueryHit {
                    position: n.position,
                    id: id.clone(),
                    distance: n.distance,
                })
            })
            .collect()
    }
}

/// Embed `query`, search `index` and map positions back to `ids`.
pub async fn search_text(
    query: &str,
    embedder: &dyn Embedder,
    index: &FlatIndex,
    ids: &[String],
    k: usize,
) -> Result<Vec<QueryHit>> {
    QueryService::new(index, ids)?
        .search_text(query, embedder, k)
        .await
}
