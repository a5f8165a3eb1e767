use crate::config::BuildConfig;
use crate::error::{IndexerError, Result};
use crate::stats::BuildStats;
use ndarray::Array2;
use retrieval_corpus::{CorpusLoader, Document, LoadOutcome, LoadReport};
use retrieval_vector_store::{
    ArtifactStore, CancellationToken, Embedder, EmbeddingBatcher, FlatIndex,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Corpus to artifacts: load, embed, index, persist.
pub struct RetrievalIndexer {
    config: BuildConfig,
    loader: CorpusLoader,
    batcher: EmbeddingBatcher,
    embedder: Arc<dyn Embedder>,
    cancel: CancellationToken,
}

impl RetrievalIndexer {
    pub fn new(config: BuildConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        config.validate()?;
        let loader = CorpusLoader::new(config.loader.clone())?;
        let batcher = EmbeddingBatcher::new(config.chunk_size)?;
        Ok(Self {
            config,
            loader,
            batcher,
            embedder,
            cancel: CancellationToken::new(),
        })
    }

    /// Abort the build once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Load the corpus on a blocking thread.
    ///
    /// An empty result is reported as [`IndexerError::EmptyCorpus`].
    pub async fn load_corpus(&self, source: &Path) -> Result<(Vec<Document>, LoadReport)> {
        let loader = self.loader.clone();
        let path = source.to_path_buf();
        let cancel = self.cancel.clone();
        let outcome = tokio::task::spawn_blocking(move || loader.load_with_cancel(&path, &cancel))
            .await
            .map_err(|e| IndexerError::Join(e.to_string()))??;

        match outcome {
            LoadOutcome::Documents { documents, report } => Ok((documents, report)),
            LoadOutcome::NoFiles => {
                log::warn!("No corpus files found under {}", source.display());
                Err(IndexerError::EmptyCorpus {
                    path: source.to_path_buf(),
                })
            }
            LoadOutcome::NoDocuments(report) => {
                log::warn!(
                    "{} corpus files under {} held no valid records ({} lines skipped)",
                    report.files.len(),
                    source.display(),
                    report.skipped_lines()
                );
                Err(IndexerError::EmptyCorpus {
                    path: source.to_path_buf(),
                })
            }
        }
    }

    /// Embed `texts` in configured chunks
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Array2<f32>> {
        let matrix = self
            .batcher
            .embed_all_with_cancel(texts, self.embedder.as_ref(), &self.cancel)
            .await?;
        Ok(matrix)
    }

    /// Build artifacts for the corpus at `source` into `out_dir`.
    ///
    /// Nothing is written unless every earlier stage succeeded.
    pub async fn build(
        &self,
        source: impl AsRef<Path>,
        out_dir: impl AsRef<Path>,
    ) -> Result<BuildStats> {
        let start = Instant::now();
        let source = source.as_ref();
        let out_dir: PathBuf = out_dir.as_ref().to_path_buf();
        let mut stats = BuildStats::new(self.embedder.model_id(), self.batcher.chunk_size());

        log::info!("Building retrieval index from {}", source.display());

        // 1. Load documents
        let (documents, report) = self.load_corpus(source).await?;
        stats.add_load_report(&report);
        log::info!(
            "Loaded {} documents from {} files in {}ms",
            documents.len(),
            report.files.len(),
            report.time_ms
        );

        let (ids, texts): (Vec<String>, Vec<String>) =
            documents.into_iter().map(|d| (d.id, d.text)).unzip();

        // 2. Embed
        let matrix = self.embed_documents(&texts).await?;
        drop(texts);
        stats.documents = matrix.nrows();
        stats.dimension = matrix.ncols();
        stats.chunks = self.batcher.chunk_count(ids.len());

        // 3. Index
        let index = FlatIndex::build(matrix);
        log::info!(
            "Indexed {} vectors of dimension {}",
            index.ntotal(),
            index.dimension()
        );

        if self.cancel.is_cancelled() {
            return Err(IndexerError::Cancelled);
        }

        // 4. Persist
        let store = ArtifactStore::with_layout(&out_dir, self.config.artifact_layout());
        store.save(&index, &ids, index.vectors()).await?;

        stats.artifact_dir = out_dir;
        stats.time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "Build complete: {} documents, {} chunks, {}ms",
            stats.documents,
            stats.chunks,
            stats.time_ms
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retrieval_vector_store::{FnEmbedder, StubEmbedder};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn write_corpus(dir: &Path, lines: &[&str]) -> PathBuf {
        let path = dir.join("corpus.jsonl");
        std::fs::write(&path, lines.join("\n")).unwrap();
        path
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let config = BuildConfig {
            chunk_size: 0,
            ..BuildConfig::default()
        };
        let embedder: Arc<dyn Embedder> = Arc::new(StubEmbedder::new(4).unwrap());
        assert!(matches!(
            RetrievalIndexer::new(config, embedder),
            Err(IndexerError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn build_single_file() {
        let tmp = TempDir::new().unwrap();
        let corpus = write_corpus(
            tmp.path(),
            &[
                r#"{"id": "1", "title": "A", "text": ["alpha"]}"#,
                r#"{"id": 2, "title": "B", "text": [["be", "ta"]]}"#,
            ],
        );
        let out = tmp.path().join("out");
        let embedder: Arc<dyn Embedder> = Arc::new(StubEmbedder::new(4).unwrap());
        let indexer = RetrievalIndexer::new(BuildConfig::default(), embedder).unwrap();

        let stats = indexer.build(&corpus, &out).await.unwrap();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.dimension, 4);
        assert_eq!(stats.chunks, 1);
        assert_eq!(stats.files, 1);
        assert_eq!(stats.model_id, "stub-4");

        let bundle = ArtifactStore::new(&out).load().await.unwrap();
        assert_eq!(bundle.ids, vec!["1".to_string(), "2".to_string()]);
    }

    #[tokio::test]
    async fn embedder_sees_flattened_text() {
        let tmp = TempDir::new().unwrap();
        let corpus = write_corpus(
            tmp.path(),
            &[r#"{"id": "1", "title": "A", "text": [["Hello", "world."], ["Bye."]]}"#],
        );
        let seen = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&seen);
        let embedder: Arc<dyn Embedder> = Arc::new(FnEmbedder::new("probe", move |batch: &[String]| {
            sink.lock().unwrap().extend(batch.iter().cloned());
            Ok(vec![vec![1.0, 0.0]; batch.len()])
        }));
        let indexer = RetrievalIndexer::new(BuildConfig::default(), embedder).unwrap();
        indexer.build(&corpus, tmp.path().join("out")).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["Hello world. Bye.".to_string()]);
    }

    #[tokio::test]
    async fn already_cancelled_build_does_not_embed() {
        let tmp = TempDir::new().unwrap();
        let corpus = write_corpus(tmp.path(), &[r#"{"id": "1", "title": "A", "text": ["x"]}"#]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let embedder: Arc<dyn Embedder> = Arc::new(FnEmbedder::new("count", move |batch: &[String]| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![vec![0.5]; batch.len()])
        }));

        let token = CancellationToken::new();
        token.cancel();
        let indexer = RetrievalIndexer::new(BuildConfig::default(), embedder)
            .unwrap()
            .with_cancellation(token);

        let out = tmp.path().join("out");
        let err = indexer.build(&corpus, &out).await.unwrap_err();
        assert!(matches!(err, IndexerError::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!out.exists());
    }
}
