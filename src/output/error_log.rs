//! Append-only fetch failure log
//!
//! Each failed fetch attempt becomes one tab-separated line:
//!
//! ```text
//! 2026-10-19T14:03:22Z	http	404	https://www.example.edu/old-page
//! 2026-10-19T14:03:25Z	timeout	request timed out	https://www.example.edu/slow
//! ```
//!
//! Lines are written straight to the file and flushed on every record.

use crate::crawler::{FailureKind, FetchFailure};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// One failed fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// The URL that failed
    pub url: String,

    /// Failure class
    pub kind: FailureKind,

    /// HTTP status code or error category
    pub detail: String,

    /// When the attempt failed
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    /// Builds a record for `url`, stamped now
    pub fn new(url: &Url, failure: &FetchFailure) -> Self {
        Self {
            url: url.as_str().to_string(),
            kind: failure.kind(),
            detail: failure.detail(),
            timestamp: Utc::now(),
        }
    }

    /// Serializes the record as a single log line (no trailing newline)
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.kind,
            single_line(&self.detail),
            self.url
        )
    }
}

fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\t' || c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Durable, append-only error log
pub struct ErrorLogger {
    path: PathBuf,
    file: File,
    recorded: usize,
}

impl ErrorLogger {
    /// Opens `path` for appending, creating it (and its parents) if needed
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            recorded: 0,
        })
    }

    /// Appends one record and flushes it
    pub fn record(&mut self, record: &ErrorRecord) -> io::Result<()> {
        let mut line = record.to_line();
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.recorded += 1;
        Ok(())
    }

    /// Syncs the log to disk
    pub fn close(self) -> io::Result<usize> {
        self.file.sync_all()?;
        Ok(self.recorded)
    }

    /// Location of the artifact
    pub fn path(&self) -> &Path {
        &self.path
    }
}
