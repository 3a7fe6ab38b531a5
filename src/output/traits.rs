//! Output sink trait and error types

use crate::output::PageRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Cannot open output {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for page records
///
/// Each `write` must be durable (flushed) before returning.
pub trait RecordSink {
    /// Appends one record
    fn write(&mut self, record: &PageRecord) -> OutputResult<()>;

    /// Flushes and releases the destination
    fn close(&mut self) -> OutputResult<()>;
}
