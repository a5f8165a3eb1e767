use super::layered_config;
use crate::{print_stdout, BuildArgs};
use anyhow::{Context, Result};
use retrieval_indexer::{BuildConfig, BuildStats, RetrievalIndexer};
use retrieval_vector_store::StubEmbedder;
use std::sync::Arc;

pub(crate) async fn run(args: BuildArgs) -> Result<()> {
    let config = resolve_config(&args).await?;
    let embedder = StubEmbedder::new(args.dim)?;
    let indexer = RetrievalIndexer::new(config, Arc::new(embedder))?;

    let stats = indexer
        .build(&args.corpus, &args.out)
        .await
        .with_context(|| format!("Failed to build index from {}", args.corpus.display()))?;

    if args.json {
        print_stdout(&serde_json::to_string_pretty(&stats)?)
    } else {
        print_stdout(&render(&stats))
    }
}

/// Defaults, then the TOML file, then environment, then flags
async fn resolve_config(args: &BuildArgs) -> Result<BuildConfig> {
    let mut config = layered_config(args.config.as_deref(), args.gzip).await?;

    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    if let Some(prefix) = &args.prefix {
        config.artifact_prefix = (!prefix.is_empty()).then(|| prefix.clone());
    }
    config.validate()?;
    Ok(config)
}

fn render(stats: &BuildStats) -> String {
    let mut out = format!(
        "Indexed {} documents from {} files in {} ms\n",
        stats.documents, stats.files, stats.time_ms
    );
    out.push_str(&format!(
        "  dimension {} | {} chunks of {} | model {}\n",
        stats.dimension, stats.chunks, stats.chunk_size, stats.model_id
    ));
    if stats.skipped_lines > 0 || stats.failed_files > 0 {
        out.push_str(&format!(
            "  skipped {} malformed lines, {} unreadable files\n",
            stats.skipped_lines, stats.failed_files
        ));
    }
    out.push_str(&format!("  artifacts in {}", stats.artifact_dir.display()));
    out
}
