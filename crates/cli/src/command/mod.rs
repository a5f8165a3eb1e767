pub(crate) mod build;
pub(crate) mod inspect;
pub(crate) mod search;

use anyhow::{Context, Result};
use retrieval_indexer::BuildConfig;
use retrieval_vector_store::{ArtifactLayout, ArtifactStore};
use std::path::Path;

/// Defaults, then the TOML file, then `RETRIEVAL_*` environment, then `--gzip`
pub(crate) async fn layered_config(path: Option<&Path>, gzip: bool) -> Result<BuildConfig> {
    let config = match path {
        Some(path) => BuildConfig::from_toml_file(path)
            .await
            .with_context(|| format!("Invalid config file {}", path.display()))?,
        None => BuildConfig::default(),
    };
    let mut config = config.apply_env()?;
    if gzip {
        config.loader = config.loader.with_gzip_shards();
    }
    Ok(config)
}

pub(crate) fn artifact_store(dir: &Path, prefix: Option<&str>) -> ArtifactStore {
    let layout = prefix.map_or_else(ArtifactLayout::default, ArtifactLayout::with_prefix);
    ArtifactStore::with_layout(dir, layout)
}
