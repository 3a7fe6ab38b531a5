//! Append-only visited log
//!
//! One canonical URL per line. The whole file is replayed into memory on open;
//! every new URL is appended and flushed before `add` returns.

use crate::storage::traits::{StorageError, StorageResult, VisitedLog};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File-backed visited set
#[derive(Debug)]
pub struct VisitedStore {
    path: PathBuf,
    urls: HashSet<String>,
    file: File,
}

impl VisitedStore {
    /// Opens (or creates) the log at `path` and loads its contents
    ///
    /// Blank lines are ignored. A last line without a terminating newline (from a
    /// crash mid-write) is kept and terminated so the next append starts cleanly.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StorageError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut urls = HashSet::new();
        let mut needs_newline = false;

        if path.exists() {
            let mut reader = File::open(path).map_err(|source| StorageError::Open {
                path: path.to_path_buf(),
                source,
            })?;

            needs_newline = ends_without_newline(&mut reader)?;
            reader.seek(SeekFrom::Start(0))?;

            for line in BufReader::new(reader).lines() {
                let line = line?;
                let url = line.trim();
                if !url.is_empty() {
                    urls.insert(url.to_string());
                }
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| StorageError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        if needs_newline {
            file.write_all(b"\n")?;
            file.flush()?;
        }

        tracing::debug!("Loaded {} visited URLs from {}", urls.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            urls,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VisitedLog for VisitedStore {
    fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    fn add(&mut self, url: &str) -> StorageResult<()> {
        if !self.urls.insert(url.to_string()) {
            return Ok(());
        }
        self.file.write_all(url.as_bytes())?;
        self.file.write_all(b"\n")?;
        self.file.flush()?;
        Ok(())
    }

    fn len(&self) -> usize {
        self.urls.len()
    }
}

/// Reads the URLs of a visited log without opening it for writing
///
/// A missing log is an empty set.
pub fn read_visited(path: &Path) -> StorageResult<HashSet<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(e) => Err(e.into()),
    }
}

fn ends_without_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
