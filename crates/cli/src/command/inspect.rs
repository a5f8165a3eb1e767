use super::artifact_store;
use crate::{print_stdout, InspectArgs};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Serialize)]
struct InspectOutput<'a> {
    ntotal: usize,
    dimension: usize,
    embeddings_shape: [usize; 2],
    ids: &'a [String],
}

pub(crate) async fn run(args: InspectArgs) -> Result<()> {
    let store = artifact_store(&args.artifacts, args.prefix.as_deref());
    let bundle = store
        .load()
        .await
        .with_context(|| format!("Failed to load artifacts from {}", args.artifacts.display()))?;

    let (rows, cols) = bundle.embeddings.dim();
    let shown = &bundle.ids[..bundle.ids.len().min(args.limit)];
    let output = InspectOutput {
        ntotal: bundle.index.ntotal(),
        dimension: bundle.index.dimension(),
        embeddings_shape: [rows, cols],
        ids: shown,
    };

    if args.json {
        return print_stdout(&serde_json::to_string_pretty(&output)?);
    }

    let mut text = format!(
        "{} vectors, dimension {}\nembeddings: {} x {}\n",
        output.ntotal, output.dimension, rows, cols
    );
    for (i, id) in shown.iter().enumerate() {
        text.push_str(&format!("{:>4}  {id}\n", i + 1));
    }
    if bundle.ids.len() > shown.len() {
        text.push_str(&format!("  ... {} more", bundle.ids.len() - shown.len()));
    }
    print_stdout(text.trim_end())
}
