use crate::config::LoaderConfig;
use crate::document::Document;
use crate::error::{CorpusError, Result};
use crate::layout::resolve_source;
use crate::reader::{open_lines, Compression};
use crate::record::parse_record;
use crate::report::{FileReport, LoadReport};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Result of a corpus load.
///
/// An empty corpus is not an error here; callers decide whether it is fatal.
#[derive(Debug)]
pub enum LoadOutcome {
    /// No strategy selected any file
    NoFiles,
    /// Files were read but none held a valid record
    NoDocuments(LoadReport),
    Documents {
        documents: Vec<Document>,
        report: LoadReport,
    },
}

impl LoadOutcome {
    pub fn is_empty(&self) -> bool {
        !matches!(self, Self::Documents { .. })
    }

    pub fn documents(&self) -> &[Document] {
        match self {
            Self::Documents { documents, .. } => documents,
            _ => &[],
        }
    }

    pub fn report(&self) -> Option<&LoadReport> {
        match self {
            Self::NoFiles => None,
            Self::NoDocuments(report) | Self::Documents { report, .. } => Some(report),
        }
    }

    pub fn into_documents(self) -> Vec<Document> {
        match self {
            Self::Documents { documents, .. } => documents,
            _ => Vec::new(),
        }
    }
}

/// Reads documents from a file, a dump directory, or a tree of shards.
#[derive(Debug, Clone, Default)]
pub struct CorpusLoader {
    config: LoaderConfig,
}

impl CorpusLoader {
    pub fn new(config: LoaderConfig) -> Result<Self> {
        config.validate().map_err(CorpusError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load every valid record under `path`, in file order then line order.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<LoadOutcome> {
        self.load_with_cancel(path, &CancellationToken::new())
    }

    /// Like [`Self::load`], checking `cancel` between files.
    pub fn load_with_cancel(
        &self,
        path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> Result<LoadOutcome> {
        let path = path.as_ref();
        let start = Instant::now();
        log::info!("Loading corpus from {}", path.display());

        let Some(source) = resolve_source(path, &self.config)? else {
            log::warn!("No data files found in {}", path.display());
            return Ok(LoadOutcome::NoFiles);
        };
        log::info!(
            "Found {} data files ({})",
            source.files.len(),
            source.layout.as_str()
        );

        let mut documents = Vec::new();
        let mut report = LoadReport {
            layout: Some(source.layout),
            ..Default::default()
        };

        for file in source.files {
            if cancel.is_cancelled() {
                return Err(CorpusError::Cancelled);
            }
            report.files.push(read_file(file, &mut documents));
        }

        report.time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!(
            "Loaded {} documents ({} malformed lines skipped, {} unreadable files) in {} ms",
            documents.len(),
            report.skipped_lines(),
            report.failed_files(),
            report.time_ms
        );

        if documents.is_empty() {
            return Ok(LoadOutcome::NoDocuments(report));
        }
        Ok(LoadOutcome::Documents { documents, report })
    }
}

fn read_file(path: PathBuf, documents: &mut Vec<Document>) -> FileReport {
    let (compression, mut reader) = match open_lines(&path) {
        Ok(opened) => opened,
        Err(e) => {
            log::warn!("Error reading {}: {e}", path.display());
            let mut report = FileReport::new(path.clone(), Compression::from_path(&path));
            report.error = Some(e.to_string());
            return report;
        }
    };

    let mut report = FileReport::new(path, compression);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                // Records read before the failure are kept
                log::warn!("Error reading {}: {e}", report.path.display());
                report.error = Some(e.to_string());
                break;
            }
        }

        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        match parse_record(trimmed) {
            Ok(doc) => {
                documents.push(doc);
                report.documents += 1;
            }
            Err(_) => report.skipped_lines += 1,
        }
    }

    if report.skipped_lines > 0 {
        log::warn!(
            "Skipped {} malformed lines in {}",
            report.skipped_lines,
            report.path.display()
        );
    }
    log::debug!(
        "{}: {} documents ({})",
        report.path.display(),
        report.documents,
        report.compression.as_str()
    );
    report
}
