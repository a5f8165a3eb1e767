//! # Retrieval Corpus
//!
//! Streaming ingestion of JSON-lines document dumps for dense retrieval.
//!
//! ## Pipeline
//!
//! ```text
//! Path
//!     │
//!     ├──> Source layout (ranked strategies)
//!     │      ├─> single file
//!     │      ├─> decompressed dump inside a directory
//!     │      └─> nested compressed shards (.bz2 / .gz)
//!     │
//!     ├──> Line reader (transparent decompression)
//!     │      └─> one JSON record per line
//!     │
//!     └──> Record normalization
//!            └─> Document { id, title, text }
//! ```
//!
//! Malformed lines and unreadable files are skipped and counted in a
//! [`LoadReport`]; they never abort a load.
//!
//! ## Example
//!
//! ```no_run
//! use retrieval_corpus::{CorpusLoader, LoadOutcome};
//!
//! fn main() -> retrieval_corpus::Result<()> {
//!     let loader = CorpusLoader::default();
//!     match loader.load("data/enwiki")? {
//!         LoadOutcome::Documents { documents, report } => {
//!             println!("{} documents from {} files", documents.len(), report.files.len());
//!         }
//!         other => println!("nothing to index: {other:?}"),
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod document;
mod error;
mod layout;
mod loader;
mod reader;
mod record;
mod report;

pub use config::{LoaderConfig, DEFAULT_DUMP_FILE_NAME, DEFAULT_SHARD_SUFFIXES};
pub use document::Document;
pub use error::{CorpusError, RecordError, Result};
pub use layout::{resolve_source, ResolvedSource, SourceLayout};
pub use loader::{CorpusLoader, LoadOutcome};
pub use reader::{open_lines, Compression};
pub use record::parse_record;
pub use report::{FileReport, LoadReport};

// Re-export so callers can cancel a load without a direct tokio-util dependency
pub use tokio_util::sync::CancellationToken;
