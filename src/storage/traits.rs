//! Storage traits and error types
//!
//! The orchestrator talks to its two durable stores through these traits so the
//! seeding logic can be exercised against in-memory doubles.

use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write checkpoint {path}: {source}")]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable set of canonical URLs that have been processed
pub trait VisitedLog {
    /// Returns true if the canonical URL has been processed
    fn contains(&self, url: &str) -> bool;

    /// Marks a canonical URL processed
    ///
    /// Idempotent: re-adding a known URL does not grow the log. When this returns
    /// `Ok`, the URL has been written through to the backing file.
    fn add(&mut self, url: &str) -> StorageResult<()>;

    /// Number of distinct URLs recorded
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory visited set with no backing file, for previews and tests
impl VisitedLog for HashSet<String> {
    fn contains(&self, url: &str) -> bool {
        HashSet::contains(self, url)
    }

    fn add(&mut self, url: &str) -> StorageResult<()> {
        self.insert(url.to_string());
        Ok(())
    }

    fn len(&self) -> usize {
        HashSet::len(self)
    }
}

/// Checkpoint of the pending URL queue
pub trait FrontierCheckpoint {
    /// Reads the last checkpoint; a missing checkpoint is an empty list
    fn load(&self) -> StorageResult<Vec<String>>;

    /// Atomically replaces the checkpoint with `urls`, in order
    fn save(&self, urls: &[String]) -> StorageResult<()>;
}
