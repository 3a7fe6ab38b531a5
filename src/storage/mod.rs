//! Storage module for persisting crawl progress
//!
//! Two flat files under the state directory make a crawl resumable:
//! - `visited_urls.txt`: append-only log of processed canonical URLs
//! - `frontier.txt`: checkpoint of the pending queue, replaced atomically

mod frontier;
mod traits;
mod visited;

pub use frontier::FrontierStore;
pub use traits::{FrontierCheckpoint, StorageError, StorageResult, VisitedLog};
pub use visited::{read_visited, VisitedStore};

use crate::url::canonicalize;
use std::collections::HashSet;
use std::path::Path;

/// Builds the initial queue for a run
///
/// The frontier checkpoint wins when it is non-empty; otherwise the configured
/// seeds are canonicalized and used. Entries already in the visited log are
/// dropped and duplicates collapse to their first occurrence.
pub fn seed_frontier(
    checkpoint: &dyn FrontierCheckpoint,
    visited: &dyn VisitedLog,
    seeds: &[String],
) -> StorageResult<Vec<String>> {
    let mut pending = checkpoint.load()?;

    if pending.is_empty() {
        pending = seeds
            .iter()
            .filter_map(|seed| match canonicalize(seed) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("Skipping seed {}: {}", seed, e);
                    None
                }
            })
            .collect();
    } else {
        tracing::info!("Resuming from checkpoint with {} pending URLs", pending.len());
    }

    let mut seen = HashSet::new();
    Ok(pending
        .into_iter()
        .filter(|url| !visited.contains(url))
        .filter(|url| seen.insert(url.clone()))
        .collect())
}

/// Deletes the visited log and frontier checkpoint for a fresh crawl
///
/// Missing files are not an error.
pub fn reset_state(visited_path: &Path, frontier_path: &Path) -> StorageResult<()> {
    for path in [visited_path, frontier_path] {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::info!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
