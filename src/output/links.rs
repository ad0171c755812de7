//! Link list artifact
//!
//! One canonical URL per line, in visitation order. Writes are buffered and
//! flushed every `flush_every` pages so a crash or kill loses at most one
//! batch of a multi-hour run.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// Buffered, periodically flushed writer for the visited-URL list
pub struct LinkWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    flush_every: usize,
    unflushed: usize,
    written: usize,
}

impl LinkWriter {
    /// Creates (or truncates) the link list at `path`
    ///
    /// Missing parent directories are created.
    pub fn create(path: &Path, flush_every: usize) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            flush_every: flush_every.max(1),
            unflushed: 0,
            written: 0,
        })
    }

    /// Appends one URL, flushing when the batch is full
    pub fn append(&mut self, url: &Url) -> io::Result<()> {
        writeln!(self.writer, "{}", url.as_str())?;
        self.written += 1;
        self.unflushed += 1;

        if self.unflushed >= self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    /// Pushes buffered lines to the file
    pub fn flush(&mut self) -> io::Result<()> {
        if self.unflushed > 0 {
            tracing::debug!("Flushing {} URLs to {}", self.unflushed, self.path.display());
        }
        self.writer.flush()?;
        self.unflushed = 0;
        Ok(())
    }

    /// Flushes and syncs the file, returning the number of URLs written
    pub fn finish(mut self) -> io::Result<usize> {
        self.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(self.written)
    }

    /// Location of the artifact
    pub fn path(&self) -> &Path {
        &self.path
    }
}
