use super::{artifact_store, layered_config};
use crate::{print_stdout, SearchArgs};
use anyhow::{Context, Result};
use retrieval_corpus::{CorpusLoader, LoaderConfig};
use retrieval_vector_store::{QueryHit, RetrievalStore, StubEmbedder};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

const UNKNOWN_TITLE: &str = "Unknown";

#[derive(Serialize)]
struct SearchResult {
    rank: usize,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    distance: f32,
}

#[derive(Serialize)]
struct SearchOutput {
    query: String,
    results: Vec<SearchResult>,
}

pub(crate) async fn run(args: SearchArgs) -> Result<()> {
    let config = layered_config(args.config.as_deref(), args.gzip).await?;
    let prefix = args.prefix.as_deref().or(config.artifact_prefix.as_deref());

    let store = RetrievalStore::load(&artifact_store(&args.artifacts, prefix))
        .await
        .with_context(|| format!("Failed to load artifacts from {}", args.artifacts.display()))?;
    let dim = args.dim.unwrap_or_else(|| store.index().dimension());
    let embedder = StubEmbedder::new(dim)?;

    let hits = store.search(&args.query, &embedder, args.k).await?;

    let titles = match &args.corpus {
        Some(corpus) => Some(load_titles(corpus.clone(), config.loader, &hits).await?),
        None => None,
    };

    let results: Vec<SearchResult> = hits
        .into_iter()
        .enumerate()
        .map(|(i, hit)| {
            let title = titles.as_ref().map(|titles| {
                titles
                    .get(&hit.id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
            });
            SearchResult {
                rank: i + 1,
                id: hit.id,
                title,
                distance: hit.distance,
            }
        })
        .collect();

    let output = SearchOutput {
        query: args.query,
        results,
    };
    if args.json {
        print_stdout(&serde_json::to_string_pretty(&output)?)
    } else {
        print_stdout(&render(&output))
    }
}

/// Titles of the hit ids, taken from the first document with each id
async fn load_titles(
    corpus: PathBuf,
    loader: LoaderConfig,
    hits: &[QueryHit],
) -> Result<HashMap<String, String>> {
    let loader = CorpusLoader::new(loader)?;
    let mut wanted: HashMap<String, Option<String>> =
        hits.iter().map(|h| (h.id.clone(), None)).collect();
    let display = corpus.display().to_string();

    let outcome = tokio::task::spawn_blocking(move || loader.load(&corpus))
        .await?
        .with_context(|| format!("Failed to load corpus {display}"))?;

    for doc in outcome.into_documents() {
        if let Some(slot) = wanted.get_mut(&doc.id) {
            if slot.is_none() {
                *slot = Some(doc.title);
            }
        }
    }
    Ok(wanted
        .into_iter()
        .filter_map(|(id, title)| title.map(|t| (id, t)))
        .collect())
}

fn render(output: &SearchOutput) -> String {
    if output.results.is_empty() {
        return format!("No results for '{}'", output.query);
    }
    let mut text = format!("Results for '{}':\n", output.query);
    for r in &output.results {
        match &r.title {
            Some(title) => text.push_str(&format!(
                "{:>3}. {} ({}) distance {:.4}\n",
                r.rank, title, r.id, r.distance
            )),
            None => text.push_str(&format!(
                "{:>3}. {} distance {:.4}\n",
                r.rank, r.id, r.distance
            )),
        }
    }
    text.trim_end().to_string()
}
