use crate::config::LoaderConfig;
use crate::error::{CorpusError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A strategy for turning a corpus path into the list of files to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLayout {
    /// The path itself is a file
    SingleFile,
    /// A directory holding the well-known decompressed dump
    DecompressedDump,
    /// A directory tree of compressed shards
    CompressedShards,
}

/// Files selected for a load, with the strategy that selected them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub layout: SourceLayout,
    pub files: Vec<PathBuf>,
}

impl SourceLayout {
    pub const DEFAULT_ORDER: [Self; 3] = [
        Self::SingleFile,
        Self::DecompressedDump,
        Self::CompressedShards,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleFile => "single_file",
            Self::DecompressedDump => "decompressed_dump",
            Self::CompressedShards => "compressed_shards",
        }
    }

    /// Files this strategy selects, or `None` when it does not apply to `path`.
    pub fn resolve(self, path: &Path, config: &LoaderConfig) -> Option<Vec<PathBuf>> {
        match self {
            Self::SingleFile => path.is_file().then(|| vec![path.to_path_buf()]),
            Self::DecompressedDump => {
                if !path.is_dir() {
                    return None;
                }
                let dump = path.join(&config.dump_file_name);
                dump.is_file().then(|| vec![dump])
            }
            Self::CompressedShards => {
                if !path.is_dir() {
                    return None;
                }
                let shards = collect_shards(path, &config.shard_suffixes);
                (!shards.is_empty()).then_some(shards)
            }
        }
    }
}

/// Evaluate the configured strategies in order and return the first match.
///
/// Returns `Ok(None)` when the path exists but no strategy selects any file.
pub fn resolve_source(path: &Path, config: &LoaderConfig) -> Result<Option<ResolvedSource>> {
    if !path.exists() {
        return Err(CorpusError::InvalidPath(path.to_path_buf()));
    }

    for layout in &config.layouts {
        if let Some(files) = layout.resolve(path, config) {
            log::debug!(
                "Resolved {} via {} ({} files)",
                path.display(),
                layout.as_str(),
                files.len()
            );
            return Ok(Some(ResolvedSource {
                layout: *layout,
                files,
            }));
        }
    }

    Ok(None)
}

fn collect_shards(root: &Path, suffixes: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for result in WalkDir::new(root) {
        match result {
            Ok(entry) => {
                let path = entry.path();
                // Follows symlinked files, unlike entry.file_type()
                if !path.is_file() {
                    continue;
                }
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())) {
                    files.push(path.to_path_buf());
                }
            }
            Err(e) => log::warn!("Failed to read entry: {e}"),
        }
    }

    // Whole-path string order, not component order
    files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    files
}
