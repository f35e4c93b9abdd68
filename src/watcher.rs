//! Incremental tailing of the full node log file.
//!
//! Uses synchronous `std::fs` reads since these are quick local operations.
//! Each poll returns only complete lines appended since the previous poll.

use std::fs;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

/// Longest unterminated tail held back for the next poll. Beyond this the
/// bytes are dropped so polls don't keep rereading them.
pub const MAX_PARTIAL_LINE_BYTES: usize = 1_048_576;

/// Follows a log file across polls, tracking the read offset.
#[derive(Debug)]
pub struct LogTailer {
    path: PathBuf,
    offset: u64,
    skip_existing: bool,
}

impl LogTailer {
    /// Tail `path` from its beginning.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            offset: 0,
            skip_existing: false,
        }
    }

    /// Tail `path`, ignoring whatever it holds at the first poll.
    pub fn from_end(path: PathBuf) -> Self {
        Self {
            path,
            offset: 0,
            skip_existing: true,
        }
    }

    /// File being tailed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Byte offset the next poll starts reading from.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Return the complete lines appended since the last poll.
    ///
    /// A trailing line without a newline is left for the next poll unless it
    /// exceeds [`MAX_PARTIAL_LINE_BYTES`], in which case it is skipped. If the
    /// file shrank (rotation or truncation) reading restarts at the top. A
    /// missing file yields an empty batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be opened or read.
    pub fn poll(&mut self) -> anyhow::Result<String> {
        if !self.path.exists() {
            self.offset = 0;
            self.skip_existing = false;
            return Ok(String::new());
        }

        let file = fs::File::open(&self.path)
            .with_context(|| format!("failed to open log file {}", self.path.display()))?;
        let file_len = file
            .metadata()
            .with_context(|| format!("failed to read metadata for {}", self.path.display()))?
            .len();

        if self.skip_existing {
            self.skip_existing = false;
            self.offset = file_len;
            debug!(path = %self.path.display(), offset = file_len, "skipping existing log content");
            return Ok(String::new());
        }

        if file_len < self.offset {
            debug!(path = %self.path.display(), "log file shrank, reading from the start");
            self.offset = 0;
        }

        let Some(available) = file_len.checked_sub(self.offset).filter(|n| *n > 0) else {
            return Ok(String::new());
        };

        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(self.offset))
            .with_context(|| format!("failed to seek in log file {}", self.path.display()))?;

        let mut buf = Vec::new();
        reader
            .take(available)
            .read_to_end(&mut buf)
            .with_context(|| format!("failed to read log file {}", self.path.display()))?;

        let Some(last_newline) = buf.iter().rposition(|b| *b == b'\n') else {
            if buf.len() > MAX_PARTIAL_LINE_BYTES {
                warn!(
                    path = %self.path.display(),
                    bytes = buf.len(),
                    "dropping overlong unterminated log line"
                );
                self.offset = file_len;
            }
            return Ok(String::new());
        };
        let complete = buf.get(..=last_newline).unwrap_or_default();

        let consumed = u64::try_from(complete.len()).context("batch length exceeds u64")?;
        self.offset = self
            .offset
            .checked_add(consumed)
            .context("log offset overflow")?;

        Ok(String::from_utf8_lossy(complete).into_owned())
    }
}
