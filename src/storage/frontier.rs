//! Frontier checkpoint file
//!
//! The pending queue is written as one URL per line to a temporary sibling file
//! and renamed over the checkpoint, so a crash never leaves a torn checkpoint.

use crate::storage::traits::{FrontierCheckpoint, StorageError, StorageResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// File-backed frontier checkpoint
#[derive(Debug, Clone)]
pub struct FrontierStore {
    path: PathBuf,
}

impl FrontierStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "frontier.txt".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl FrontierCheckpoint for FrontierStore {
    fn load(&self) -> StorageResult<Vec<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn save(&self, urls: &[String]) -> StorageResult<()> {
        let tmp = self.temp_path();
        let checkpoint_err = |source| StorageError::Checkpoint {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(checkpoint_err)?;
            }
        }

        let file = File::create(&tmp).map_err(checkpoint_err)?;
        let mut writer = BufWriter::new(file);
        for url in urls {
            writer.write_all(url.as_bytes()).map_err(checkpoint_err)?;
            writer.write_all(b"\n").map_err(checkpoint_err)?;
        }
        let file = writer
            .into_inner()
            .map_err(|e| checkpoint_err(e.into_error()))?;
        file.sync_all().map_err(checkpoint_err)?;
        drop(file);

        std::fs::rename(&tmp, &self.path).map_err(checkpoint_err)?;

        tracing::debug!("Checkpointed {} frontier URLs", urls.len());
        Ok(())
    }
}
