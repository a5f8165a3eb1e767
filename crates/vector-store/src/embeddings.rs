use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;

/// Default width of [`StubEmbedder`] vectors
pub const DEFAULT_STUB_DIMENSION: usize = 384;

/// Text → vector function used to embed the corpus and queries.
///
/// One row per input text, in input order, with the same width on every call.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Identifier recorded in build statistics
    fn model_id(&self) -> &str;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text as a one-element batch
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut rows = self.embed_batch(&[text.to_string()]).await?;
        if rows.len() != 1 {
            return Err(VectorStoreError::EmbeddingError(format!(
                "embedder returned {} rows for a single query",
                rows.len()
            )));
        }
        Ok(rows.swap_remove(0))
    }
}

/// Deterministic hash-based embedder.
///
/// Equal texts map to equal unit vectors; unrelated texts land roughly
/// orthogonal. Useful wherever a real model is unavailable or unwanted.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
    model_id: String,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(VectorStoreError::InvalidConfig(
                "stub embedding dimension must be > 0".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            model_id: format!("stub-{dimension}"),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| stub_embed(text, self.dimension))
            .collect())
    }
}

/// Adapts a plain function or closure into an [`Embedder`].
pub struct FnEmbedder<F> {
    model_id: String,
    embed: F,
}

impl<F> FnEmbedder<F>
where
    F: Fn(&[String]) -> Result<Vec<Vec<f32>>> + Send + Sync,
{
    pub fn new(model_id: impl Into<String>, embed: F) -> Self {
        Self {
            model_id: model_id.into(),
            embed,
        }
    }
}

#[async_trait]
impl<F> Embedder for FnEmbedder<F>
where
    F: Fn(&[String]) -> Result<Vec<Vec<f32>>> + Send + Sync,
{
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        (self.embed)(texts)
    }
}

fn stub_embed(text: &str, dimension: usize) -> Vec<f32> {
    let mut state =
        fnv1a_64(text.as_bytes()) ^ (dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut vec = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        let bits = splitmix64(&mut state);
        let high = (bits >> 32) as u32;
        let mantissa = high >> 9;
        let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
        vec.push(unit.mul_add(2.0, -1.0));
    }
    normalize(&mut vec);
    vec
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vec.iter_mut() {
            *v /= norm;
        }
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_is_deterministic_and_normalized() {
        let embedder = StubEmbedder::new(16).unwrap();
        let texts = vec!["light bulb".to_string(), "Thomas Edison".to_string()];
        let first = embedder.embed_batch(&texts).await.unwrap();
        let second = embedder.embed_batch(&texts).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_ne!(first[0], first[1]);
        for row in &first {
            assert_eq!(row.len(), 16);
            let norm: f32 = row.iter().map(|v| v * v).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[tokio::test]
    async fn single_embed_matches_batch_row() {
        let embedder = StubEmbedder::new(8).unwrap();
        let single = embedder.embed("query").await.unwrap();
        let batch = embedder.embed_batch(&["query".to_string()]).await.unwrap();
        assert_eq!(single, batch[0]);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(StubEmbedder::new(0).is_err());
    }

    #[tokio::test]
    async fn fn_embedder_must_return_one_row_per_query() {
        let embedder = FnEmbedder::new("empty", |_texts: &[String]| Ok(Vec::new()));
        assert!(matches!(
            embedder.embed("anything").await,
            Err(VectorStoreError::EmbeddingError(_))
        ));
    }
}
