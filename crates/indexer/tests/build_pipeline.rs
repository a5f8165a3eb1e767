use pretty_assertions::assert_eq;
use retrieval_indexer::{BuildConfig, IndexerError, RetrievalIndexer};
use retrieval_vector_store::{
    ArtifactLayout, ArtifactStore, Embedder, FnEmbedder, RetrievalStore, StubEmbedder,
    VectorStoreError,
};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn write_bz2(path: &Path, lines: &[String]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    for line in lines {
        writeln!(encoder, "{line}").unwrap();
    }
    std::fs::write(path, encoder.finish().unwrap()).unwrap();
}

fn record(id: &str, title: &str, sentence: &str) -> String {
    format!(r#"{{"id": "{id}", "title": "{title}", "text": [["{sentence}"]]}}"#)
}

fn wiki_tree(root: &Path) {
    write_bz2(
        &root.join("AA/wiki_00.bz2"),
        &[
            record("1", "Thomas Edison", "Edison patented a light bulb."),
            record("2", "Nikola Tesla", "Tesla worked on alternating current."),
        ],
    );
    write_bz2(
        &root.join("AB/wiki_00.bz2"),
        &[
            "{not json".to_string(),
            record("3", "Marie Curie", "Curie studied radioactivity."),
        ],
    );
}

fn stub(dim: usize) -> Arc<dyn Embedder> {
    Arc::new(StubEmbedder::new(dim).unwrap())
}

#[tokio::test]
async fn compressed_shards_end_to_end() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("wiki");
    wiki_tree(&corpus);
    let out = tmp.path().join("artifacts");

    let config = BuildConfig {
        chunk_size: 2,
        ..BuildConfig::default()
    };
    let embedder = stub(16);
    let indexer = RetrievalIndexer::new(config, Arc::clone(&embedder)).unwrap();
    let stats = indexer.build(&corpus, &out).await.unwrap();

    assert_eq!(stats.documents, 3);
    assert_eq!(stats.files, 2);
    assert_eq!(stats.skipped_lines, 1);
    assert_eq!(stats.failed_files, 0);
    assert_eq!(stats.chunks, 2);
    assert_eq!(stats.dimension, 16);

    let store = RetrievalStore::open(&out).await.unwrap();
    assert_eq!(store.ids(), ["1", "2", "3"]);

    // Querying with a document's own text finds that document first
    let hits = store
        .search("Tesla worked on alternating current.", embedder.as_ref(), 3)
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].id, "2");
    assert!(hits[0].distance.abs() < 1e-5);
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[tokio::test]
async fn empty_corpus_fails_before_embedding() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("empty");
    std::fs::create_dir_all(corpus.join("AA")).unwrap();
    std::fs::write(corpus.join("AA/readme.txt"), "not a shard").unwrap();
    let out = tmp.path().join("artifacts");

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let embedder: Arc<dyn Embedder> = Arc::new(FnEmbedder::new("count", move |batch: &[String]| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(vec![vec![1.0]; batch.len()])
    }));

    let indexer = RetrievalIndexer::new(BuildConfig::default(), embedder).unwrap();
    let err = indexer.build(&corpus, &out).await.unwrap_err();

    assert!(matches!(err, IndexerError::EmptyCorpus { ref path } if *path == corpus));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!out.exists());
}

#[tokio::test]
async fn shards_without_valid_records_are_an_empty_corpus() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("wiki");
    write_bz2(
        &corpus.join("AA/wiki_00.bz2"),
        &["{broken".to_string(), r#"{"id": "1"}"#.to_string()],
    );

    let indexer = RetrievalIndexer::new(BuildConfig::default(), stub(4)).unwrap();
    let err = indexer
        .build(&corpus, tmp.path().join("artifacts"))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexerError::EmptyCorpus { .. }));
}

#[tokio::test]
async fn missing_corpus_path_is_a_corpus_error() {
    let tmp = TempDir::new().unwrap();
    let indexer = RetrievalIndexer::new(BuildConfig::default(), stub(4)).unwrap();
    let err = indexer
        .build(tmp.path().join("nope"), tmp.path().join("artifacts"))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexerError::Corpus(_)));
}

#[tokio::test]
async fn dimension_change_aborts_without_artifacts() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("wiki");
    wiki_tree(&corpus);
    let out = tmp.path().join("artifacts");

    // Width 4 for the first chunk, 5 afterwards
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let embedder: Arc<dyn Embedder> = Arc::new(FnEmbedder::new("drift", move |batch: &[String]| {
        let width = if counter.fetch_add(1, Ordering::SeqCst) == 0 { 4 } else { 5 };
        Ok(vec![vec![0.25; width]; batch.len()])
    }));
    let config = BuildConfig {
        chunk_size: 2,
        ..BuildConfig::default()
    };

    let indexer = RetrievalIndexer::new(config, embedder).unwrap();
    let err = indexer.build(&corpus, &out).await.unwrap_err();

    assert!(matches!(
        err,
        IndexerError::VectorStore(VectorStoreError::DimensionMismatch {
            expected: 4,
            actual: 5,
            chunk: 1
        })
    ));
    assert!(!ArtifactStore::new(&out).exists().await);
}

#[tokio::test]
async fn rebuild_is_byte_identical() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("wiki");
    wiki_tree(&corpus);
    let first = tmp.path().join("first");
    let second = tmp.path().join("second");

    let indexer = RetrievalIndexer::new(BuildConfig::default(), stub(8)).unwrap();
    indexer.build(&corpus, &first).await.unwrap();
    indexer.build(&corpus, &second).await.unwrap();

    let a = ArtifactStore::new(&first);
    let b = ArtifactStore::new(&second);
    for (x, y) in [
        (a.index_path(), b.index_path()),
        (a.ids_path(), b.ids_path()),
        (a.embeddings_path(), b.embeddings_path()),
    ] {
        assert_eq!(std::fs::read(x).unwrap(), std::fs::read(y).unwrap());
    }
}

#[tokio::test]
async fn artifact_prefix_names_files() {
    let tmp = TempDir::new().unwrap();
    let corpus = tmp.path().join("wiki");
    wiki_tree(&corpus);
    let out = tmp.path().join("artifacts");

    let config = BuildConfig {
        artifact_prefix: Some("wikipedia".to_string()),
        ..BuildConfig::default()
    };
    let indexer = RetrievalIndexer::new(config, stub(4)).unwrap();
    indexer.build(&corpus, &out).await.unwrap();

    assert!(out.join("wikipedia_flat_index.bin").exists());
    assert!(out.join("wikipedia_corpus_ids.json").exists());
    assert!(out.join("wikipedia_corpus_embeddings.npy").exists());

    let store = ArtifactStore::with_layout(&out, ArtifactLayout::with_prefix("wikipedia"));
    assert_eq!(store.load().await.unwrap().ids.len(), 3);
}
