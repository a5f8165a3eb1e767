use crate::layout::SourceLayout;
use serde::{Deserialize, Serialize};

/// File name of the single decompressed dump that takes precedence over shards
pub const DEFAULT_DUMP_FILE_NAME: &str = "enwiki-20171001-pages-meta-current-withlinks-processed";

/// Suffixes that identify compressed shard files
pub const DEFAULT_SHARD_SUFFIXES: &[&str] = &[".bz2"];

/// Configuration for corpus discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Name of the decompressed dump looked up directly under a directory
    pub dump_file_name: String,

    /// File name suffixes collected by the shard strategy
    pub shard_suffixes: Vec<String>,

    /// Resolution strategies, tried in order
    pub layouts: Vec<SourceLayout>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            dump_file_name: DEFAULT_DUMP_FILE_NAME.to_string(),
            shard_suffixes: DEFAULT_SHARD_SUFFIXES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            layouts: SourceLayout::DEFAULT_ORDER.to_vec(),
        }
    }
}

impl LoaderConfig {
    /// Also collect gzip shards
    pub fn with_gzip_shards(mut self) -> Self {
        if !self.shard_suffixes.iter().any(|s| s == ".gz") {
            self.shard_suffixes.push(".gz".to_string());
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.dump_file_name.is_empty() {
            return Err("dump_file_name must not be empty".to_string());
        }

        if self.shard_suffixes.is_empty() {
            return Err("shard_suffixes must list at least one suffix".to_string());
        }

        if self.shard_suffixes.iter().any(String::is_empty) {
            return Err("shard_suffixes must not contain empty suffixes".to_string());
        }

        if self.layouts.is_empty() {
            return Err("layouts must list at least one strategy".to_string());
        }

        Ok(())
    }
}
