use crate::error::{IndexerError, Result};
use retrieval_corpus::LoaderConfig;
use retrieval_vector_store::{ArtifactLayout, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_CHUNK_SIZE: &str = "RETRIEVAL_CHUNK_SIZE";
pub const ENV_ARTIFACT_PREFIX: &str = "RETRIEVAL_ARTIFACT_PREFIX";

/// Settings for one build.
///
/// Layered as: defaults, then an optional TOML file, then environment
/// variables, then whatever the caller sets explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Texts per embedder call
    pub chunk_size: usize,

    /// Prepended to every artifact file name as `<prefix>_`
    pub artifact_prefix: Option<String>,

    pub loader: LoaderConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            artifact_prefix: None,
            loader: LoaderConfig::default(),
        }
    }
}

impl BuildConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        log::debug!("Loaded build config from {}", path.display());
        Self::from_toml_str(&raw)
    }

    /// Override fields from `RETRIEVAL_*` environment variables
    pub fn apply_env(self) -> Result<Self> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(raw) = lookup(ENV_CHUNK_SIZE) {
            self.chunk_size = raw.trim().parse().map_err(|_| {
                IndexerError::InvalidConfig(format!("{ENV_CHUNK_SIZE}={raw:?} is not a number"))
            })?;
        }
        if let Some(prefix) = lookup(ENV_ARTIFACT_PREFIX) {
            let prefix = prefix.trim();
            self.artifact_prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(IndexerError::InvalidConfig(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if let Some(prefix) = &self.artifact_prefix {
            if prefix.contains(['/', '\\']) {
                return Err(IndexerError::InvalidConfig(format!(
                    "artifact_prefix {prefix:?} must not contain path separators"
                )));
            }
        }
        self.loader.validate().map_err(IndexerError::InvalidConfig)
    }

    pub fn artifact_layout(&self) -> ArtifactLayout {
        match &self.artifact_prefix {
            Some(prefix) => ArtifactLayout::with_prefix(prefix),
            None => ArtifactLayout::default(),
        }
    }
}
