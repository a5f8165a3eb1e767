use crate::embeddings::Embedder;
use crate::error::{Result, VectorStoreError};
use ndarray::Array2;
use tokio_util::sync::CancellationToken;

/// Texts embedded per embedder call unless configured otherwise
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Embeds a text sequence in fixed-size chunks and stacks the results.
///
/// Peak memory of a single embedder call is bounded by `chunk_size`; the
/// output matrix is accumulated across chunks.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddingBatcher {
    chunk_size: usize,
}

impl Default for EmbeddingBatcher {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl EmbeddingBatcher {
    pub fn new(chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(VectorStoreError::InvalidConfig(
                "chunk_size must be > 0".to_string(),
            ));
        }
        Ok(Self { chunk_size })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of embedder calls needed for `texts` texts
    pub fn chunk_count(&self, texts: usize) -> usize {
        texts.div_ceil(self.chunk_size)
    }

    /// Embed every text; row `i` of the output belongs to `texts[i]`.
    pub async fn embed_all(&self, texts: &[String], embedder: &dyn Embedder) -> Result<Array2<f32>> {
        self.embed_all_with_cancel(texts, embedder, &CancellationToken::new())
            .await
    }

    /// Like [`Self::embed_all`], checking `cancel` before each chunk.
    pub async fn embed_all_with_cancel(
        &self,
        texts: &[String],
        embedder: &dyn Embedder,
        cancel: &CancellationToken,
    ) -> Result<Array2<f32>> {
        if texts.is_empty() {
            return Ok(Array2::zeros((0, 0)));
        }

        let chunks = self.chunk_count(texts.len());
        log::info!(
            "Generating embeddings for {} texts in {} chunks of {} ({})",
            texts.len(),
            chunks,
            self.chunk_size,
            embedder.model_id()
        );

        let mut dimension: Option<usize> = None;
        let mut data: Vec<f32> = Vec::new();

        for (chunk_index, chunk) in texts.chunks(self.chunk_size).enumerate() {
            if cancel.is_cancelled() {
                return Err(VectorStoreError::Cancelled);
            }

            let rows = embedder.embed_batch(chunk).await?;
            if rows.len() != chunk.len() {
                return Err(VectorStoreError::EmbeddingError(format!(
                    "chunk {chunk_index}: embedder returned {} rows for {} texts",
                    rows.len(),
                    chunk.len()
                )));
            }

            for row in &rows {
                let expected = match dimension {
                    Some(expected) => expected,
                    None => {
                        if row.is_empty() {
                            return Err(VectorStoreError::EmbeddingError(
                                "embedder returned zero-width vectors".to_string(),
                            ));
                        }
                        dimension = Some(row.len());
                        data.reserve(texts.len() * row.len());
                        row.len()
                    }
                };
                if row.len() != expected {
                    return Err(VectorStoreError::DimensionMismatch {
                        expected,
                        actual: row.len(),
                        chunk: chunk_index,
                    });
                }
                data.extend_from_slice(row);
            }

            log::debug!("Embedded chunk {}/{}", chunk_index + 1, chunks);
        }

        let dimension = dimension.unwrap_or(0);
        let matrix = Array2::from_shape_vec((texts.len(), dimension), data)
            .map_err(|e| VectorStoreError::IndexError(e.to_string()))?;
        log::info!("Generated embeddings with shape {:?}", matrix.dim());
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{FnEmbedder, StubEmbedder};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("document {i}")).collect()
    }

    #[tokio::test]
    async fn chunks_preserve_order_and_count_calls() {
        let calls = AtomicUsize::new(0);
        let embedder = FnEmbedder::new("index", |batch: &[String]| {
            calls.fetch_add(1, Ordering::Relaxed);
            Ok(batch
                .iter()
                .map(|t| {
                    let n: f32 = t.trim_start_matches("document ").parse().unwrap();
                    vec![n, -n]
                })
                .collect())
        });

        let batcher = EmbeddingBatcher::new(3).unwrap();
        let matrix = batcher.embed_all(&texts(7), &embedder).await.unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 3);
        assert_eq!(matrix.dim(), (7, 2));
        for i in 0..7 {
            assert_eq!(matrix[[i, 0]], i as f32);
            assert_eq!(matrix[[i, 1]], -(i as f32));
        }
    }

    #[tokio::test]
    async fn empty_input_yields_zero_rows_without_calls() {
        let embedder = FnEmbedder::new("never", |_batch: &[String]| -> Result<Vec<Vec<f32>>> {
            panic!("embedder must not be called")
        });
        let matrix = EmbeddingBatcher::default()
            .embed_all(&[], &embedder)
            .await
            .unwrap();
        assert_eq!(matrix.nrows(), 0);
    }

    #[tokio::test]
    async fn width_change_between_chunks_is_fatal() {
        let calls = AtomicUsize::new(0);
        let embedder = FnEmbedder::new("drift", |batch: &[String]| {
            let width = if calls.fetch_add(1, Ordering::Relaxed) == 0 { 4 } else { 5 };
            Ok(vec![vec![0.5; width]; batch.len()])
        });

        let err = EmbeddingBatcher::new(2)
            .unwrap()
            .embed_all(&texts(4), &embedder)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VectorStoreError::DimensionMismatch {
                expected: 4,
                actual: 5,
                chunk: 1
            }
        ));
    }

    #[tokio::test]
    async fn row_count_mismatch_is_fatal() {
        let embedder = FnEmbedder::new("short", |batch: &[String]| {
            Ok(vec![vec![1.0]; batch.len() - 1])
        });
        let err = EmbeddingBatcher::new(5)
            .unwrap()
            .embed_all(&texts(3), &embedder)
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::EmbeddingError(_)));
    }

    #[tokio::test]
    async fn cancellation_is_checked_between_chunks() {
        let cancel = CancellationToken::new();
        let embedder = FnEmbedder::new("cancel", |batch: &[String]| {
            cancel.cancel();
            Ok(vec![vec![1.0]; batch.len()])
        });
        let err = EmbeddingBatcher::new(1)
            .unwrap()
            .embed_all_with_cancel(&texts(3), &embedder, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::Cancelled));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            EmbeddingBatcher::new(0),
            Err(VectorStoreError::InvalidConfig(_))
        ));
    }

    proptest! {
        #[test]
        fn proptest_chunk_size_does_not_change_output(n in 0usize..40, chunk_size in 1usize..50) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let embedder = StubEmbedder::new(6).unwrap();
            let input = texts(n);

            let (chunked, whole) = runtime.block_on(async {
                let chunked = EmbeddingBatcher::new(chunk_size)
                    .unwrap()
                    .embed_all(&input, &embedder)
                    .await
                    .unwrap();
                let whole = EmbeddingBatcher::new(n.max(1))
                    .unwrap()
                    .embed_all(&input, &embedder)
                    .await
                    .unwrap();
                (chunked, whole)
            });

            prop_assert_eq!(chunked.nrows(), n);
            prop_assert_eq!(chunked, whole);
        }
    }
}
