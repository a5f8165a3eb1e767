use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const INDEX_FILE_NAME: &str = "flat_index.bin";
pub const IDS_FILE_NAME: &str = "corpus_ids.json";
pub const EMBEDDINGS_FILE_NAME: &str = "corpus_embeddings.npy";

const TMP_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".bak";

/// File names of the three artifacts that make up one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactLayout {
    pub index_file: String,
    pub ids_file: String,
    pub embeddings_file: String,
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self {
            index_file: INDEX_FILE_NAME.to_string(),
            ids_file: IDS_FILE_NAME.to_string(),
            embeddings_file: EMBEDDINGS_FILE_NAME.to_string(),
        }
    }
}

impl ArtifactLayout {
    /// `wikipedia` → `wikipedia_flat_index.bin`, `wikipedia_corpus_ids.json`, ...
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        if prefix.is_empty() {
            return Self::default();
        }
        Self {
            index_file: format!("{prefix}_{INDEX_FILE_NAME}"),
            ids_file: format!("{prefix}_{IDS_FILE_NAME}"),
            embeddings_file: format!("{prefix}_{EMBEDDINGS_FILE_NAME}"),
        }
    }
}

/// Sibling path a file is staged at before being renamed into place
#[must_use]
pub fn staging_path(path: &Path) -> PathBuf {
    with_suffix(path, TMP_SUFFIX)
}

/// Sibling path a replaced file is parked at until a save completes
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    with_suffix(path, BACKUP_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_prepended() {
        let layout = ArtifactLayout::with_prefix("wikipedia");
        assert_eq!(layout.index_file, "wikipedia_flat_index.bin");
        assert_eq!(layout.ids_file, "wikipedia_corpus_ids.json");
        assert_eq!(layout.embeddings_file, "wikipedia_corpus_embeddings.npy");
        assert_eq!(ArtifactLayout::with_prefix(""), ArtifactLayout::default());
    }

    #[test]
    fn staging_path_keeps_directory() {
        let staged = staging_path(Path::new("/out/corpus_ids.json"));
        assert_eq!(staged, PathBuf::from("/out/corpus_ids.json.tmp"));
        assert_eq!(
            backup_path(Path::new("/out/corpus_ids.json")),
            PathBuf::from("/out/corpus_ids.json.bak")
        );
    }
}
