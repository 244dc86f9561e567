//! Append-only archive writer.
//!
//! ## Stream Layout
//!
//! ```text
//! {dir}/
//! ├── conversations.log   # one JSON conversation per line
//! └── messages.log        # one JSON message per line
//! ```
//!
//! Lines are only ever appended. Each record is flushed before `archive`
//! returns, so an interrupted run keeps everything written before it.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{AppError, Result};
use crate::models::{ArchiveConfig, KeyField};
use crate::storage::{ArchiveRecord, BloomDedup, DedupFilter};

/// What `archive` did with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Appended to the stream
    Written,
    /// Key already seen this run; nothing written
    Duplicate,
}

/// Totals for one stream, reported on close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub archive_type: String,
    pub path: PathBuf,
    pub written: usize,
    pub duplicates: usize,
}

/// Path of the stream for `archive_type` under `dir`.
///
/// Only the final path component of `archive_type` is used, so a type can
/// never point outside `dir`.
pub fn archive_path(dir: &Path, archive_type: &str) -> Result<PathBuf> {
    let name = Path::new(archive_type)
        .file_name()
        .ok_or_else(|| AppError::validation(format!("Invalid archive type '{archive_type}'")))?;
    Ok(dir.join(name).with_extension("log"))
}

/// Scoped writer for one archive stream.
///
/// The file handle is opened in [`open`](Self::open) and released when the
/// writer is closed or dropped.
pub struct ArchiveWriter<F: DedupFilter = BloomDedup> {
    archive_type: String,
    path: PathBuf,
    file: File,
    filter: F,
    key: KeyField,
    written: usize,
    duplicates: usize,
}

impl ArchiveWriter<BloomDedup> {
    /// Open the stream for `archive_type` with a fresh Bloom filter sized from `config`.
    pub async fn open(config: &ArchiveConfig, archive_type: &str) -> Result<Self> {
        let filter = BloomDedup::new(config.max_conversations, config.error_rate);
        Self::with_filter(&config.dir, archive_type, filter, config.key).await
    }
}

impl<F: DedupFilter> ArchiveWriter<F> {
    /// Open the stream with a caller-supplied filter.
    pub async fn with_filter(
        dir: &Path,
        archive_type: &str,
        filter: F,
        key: KeyField,
    ) -> Result<Self> {
        let path = archive_path(dir, archive_type)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        log::debug!("Opened archive stream {}", path.display());

        Ok(Self {
            archive_type: archive_type.to_string(),
            path,
            file,
            filter,
            key,
            written: 0,
            duplicates: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Append `record` unless its key was already archived this run.
    pub async fn archive<R: ArchiveRecord>(&mut self, record: &R) -> Result<ArchiveOutcome> {
        let key = record.dedup_key(self.key);

        if self.filter.test(&key) {
            log::debug!("Already archived '{}', skipping", key);
            self.duplicates += 1;
            return Ok(ArchiveOutcome::Duplicate);
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;

        self.filter.add(&key);
        self.written += 1;
        log::info!("Archived '{}' to {}", key, self.archive_type);

        Ok(ArchiveOutcome::Written)
    }

    /// Flush and release the stream.
    pub async fn close(mut self) -> Result<ArchiveSummary> {
        self.file.flush().await?;
        Ok(ArchiveSummary {
            archive_type: self.archive_type,
            path: self.path,
            written: self.written,
            duplicates: self.duplicates,
        })
    }
}

/// Read every record of a stream back. A missing stream reads as empty.
pub async fn read_archive<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(AppError::Io(e)),
    };

    let mut lines = BufReader::new(file).lines();
    let mut records = Vec::new();
    let mut line_no = 0;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .map_err(|e| AppError::corrupt_archive(path.display().to_string(), line_no, e))?;
        records.push(record);
    }
    Ok(records)
}
