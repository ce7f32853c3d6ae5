//! Run-file naming and large-buffer I/O (spec §4.4/§6).

use crate::error::SortError;
use crate::key::KeyKind;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Builds the `<key>.run.<seq>.tmp` name used by both the run generator and
/// the merger.
pub fn run_file_name(kind: KeyKind, seq: u64) -> String {
    format!("{}.run.{}.tmp", kind.as_str(), seq)
}

pub struct RunWriter {
    inner: BufWriter<File>,
    path: PathBuf,
}

impl RunWriter {
    pub fn create(path: impl Into<PathBuf>, buffer_bytes: usize) -> Result<Self, SortError> {
        let path = path.into();
        let file = File::create(&path).map_err(|e| SortError::io("run-generation", &path, e))?;
        Ok(RunWriter {
            inner: BufWriter::with_capacity(buffer_bytes, file),
            path,
        })
    }

    pub fn write_line(&mut self, line: &[u8]) -> Result<(), SortError> {
        self.inner
            .write_all(line)
            .map_err(|e| SortError::io("run-generation", &self.path, e))
    }

    pub fn finish(mut self) -> Result<(), SortError> {
        self.inner
            .flush()
            .map_err(|e| SortError::io("run-generation", &self.path, e))
    }
}

pub struct RunReader {
    inner: BufReader<File>,
    pub path: PathBuf,
}

impl RunReader {
    pub fn open(path: impl AsRef<Path>, buffer_bytes: usize) -> Result<Self, SortError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| SortError::io("merge", &path, e))?;
        Ok(RunReader {
            inner: BufReader::with_capacity(buffer_bytes, file),
            path,
        })
    }

    /// Reads the next line into `buf` (cleared first), including its
    /// trailing `\n`. Returns `Ok(true)` if a line was read, `Ok(false)` at
    /// EOF. A read error is reported rather than silently treated as EOF;
    /// callers that want the "treat as exhausted" merge policy decide that
    /// at the call site (see `merger.rs`).
    pub fn read_line_into(&mut self, buf: &mut String) -> std::io::Result<bool> {
        buf.clear();
        let n = self.inner.read_line(buf)?;
        Ok(n > 0)
    }
}
