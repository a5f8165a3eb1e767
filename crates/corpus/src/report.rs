use crate::layout::SourceLayout;
use crate::reader::Compression;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of reading one input file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,

    pub compression: Compression,

    /// Documents produced by this file
    pub documents: usize,

    /// Non-blank lines rejected as malformed records
    pub skipped_lines: usize,

    /// Read failure, if the file could not be read to the end
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(path: PathBuf, compression: Compression) -> Self {
        Self {
            path,
            compression,
            documents: 0,
            skipped_lines: 0,
            error: None,
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Statistics about a corpus load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Strategy that selected the input files
    pub layout: Option<SourceLayout>,

    pub files: Vec<FileReport>,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl LoadReport {
    pub fn documents(&self) -> usize {
        self.files.iter().map(|f| f.documents).sum()
    }

    pub fn skipped_lines(&self) -> usize {
        self.files.iter().map(|f| f.skipped_lines).sum()
    }

    pub fn failed_files(&self) -> usize {
        self.files.iter().filter(|f| f.failed()).count()
    }
}
