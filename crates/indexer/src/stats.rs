use retrieval_corpus::LoadReport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Statistics about a build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildStats {
    /// Documents embedded and indexed
    pub documents: usize,

    /// Corpus files read
    pub files: usize,

    /// Files that could not be read to the end
    pub failed_files: usize,

    /// Malformed lines skipped while loading
    pub skipped_lines: usize,

    /// Embedding width
    pub dimension: usize,

    /// Embedder calls made
    pub chunks: usize,

    pub chunk_size: usize,

    pub model_id: String,

    pub artifact_dir: PathBuf,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl BuildStats {
    pub fn new(model_id: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            model_id: model_id.into(),
            chunk_size,
            ..Self::default()
        }
    }

    pub fn add_load_report(&mut self, report: &LoadReport) {
        self.files += report.files.len();
        self.failed_files += report.failed_files();
        self.skipped_lines += report.skipped_lines();
    }
}
