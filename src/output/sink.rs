//! JSONL record sink and text mirror

use crate::output::record::sha256_hex;
use crate::output::traits::{OutputError, OutputResult, RecordSink};
use crate::output::PageRecord;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends one JSON object per line to the records file
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    file: Option<File>,
    written: u64,
}

impl JsonlSink {
    /// Opens the records file for appending, creating it (and its parent) if needed
    ///
    /// Existing records are never truncated.
    pub fn open(path: &Path) -> OutputResult<Self> {
        let open_err = |source| OutputError::Open {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(open_err)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written through this handle
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl RecordSink for JsonlSink {
    fn write(&mut self, record: &PageRecord) -> OutputResult<()> {
        let file = self.file.as_mut().ok_or_else(|| {
            OutputError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "record sink already closed",
            ))
        })?;

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        file.write_all(&line)?;
        file.flush()?;

        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> OutputResult<()> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
            file.sync_all()?;
        }
        Ok(())
    }
}

/// Writes `text` to `{mirror_dir}/{sha256(url)}.txt`
///
/// Returns `Ok(None)` when no mirror directory is configured.
pub fn write_mirror(mirror_dir: Option<&Path>, url: &str, text: &str) -> OutputResult<Option<PathBuf>> {
    let Some(dir) = mirror_dir else {
        return Ok(None);
    };

    let path = dir.join(mirror_file_name(url));
    std::fs::write(&path, text.as_bytes())?;
    Ok(Some(path))
}

/// Content-addressed file name for a URL's mirror
pub fn mirror_file_name(url: &str) -> String {
    format!("{}.txt", sha256_hex(url))
}
