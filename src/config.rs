//! Configuration surface for one engine invocation (spec §6/§10.3).
//!
//! Fixed for the lifetime of the invocation; no dynamic reloading.

use crate::error::SortError;
use std::path::PathBuf;

const DEFAULT_MEM_LIMIT_RECORDS: usize = 100_000;
const DEFAULT_INPUT_CHANNEL_CAPACITY: usize = 10_000;
const DEFAULT_MERGE_READER_BUFFER_BYTES: usize = 1 << 20;
const DEFAULT_RUN_WRITER_BUFFER_BYTES: usize = 1 << 20;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub run_dir: PathBuf,
    pub mem_limit_records: usize,
    pub input_channel_capacity: usize,
    pub merge_reader_buffer_bytes: usize,
    pub run_writer_buffer_bytes: usize,
}

impl EngineConfig {
    /// Builds a config with the documented defaults for everything but
    /// `run_dir` and `mem_limit_records`, validating as it goes.
    pub fn new(run_dir: impl Into<PathBuf>, mem_limit_records: usize) -> Result<Self, SortError> {
        if mem_limit_records == 0 {
            return Err(SortError::Config(
                "mem_limit_records must be positive; 0 buffers every flush and never makes progress".into(),
            ));
        }
        Ok(EngineConfig {
            run_dir: run_dir.into(),
            mem_limit_records,
            input_channel_capacity: DEFAULT_INPUT_CHANNEL_CAPACITY,
            merge_reader_buffer_bytes: DEFAULT_MERGE_READER_BUFFER_BYTES,
            run_writer_buffer_bytes: DEFAULT_RUN_WRITER_BUFFER_BYTES,
        })
    }

    pub fn with_input_channel_capacity(mut self, capacity: usize) -> Result<Self, SortError> {
        if capacity == 0 {
            return Err(SortError::Config(
                "input_channel_capacity must be positive".into(),
            ));
        }
        self.input_channel_capacity = capacity;
        Ok(self)
    }

    pub fn with_merge_reader_buffer_bytes(mut self, bytes: usize) -> Result<Self, SortError> {
        if bytes == 0 {
            return Err(SortError::Config(
                "merge_reader_buffer_bytes must be positive".into(),
            ));
        }
        self.merge_reader_buffer_bytes = bytes;
        Ok(self)
    }

    pub fn with_run_writer_buffer_bytes(mut self, bytes: usize) -> Result<Self, SortError> {
        if bytes == 0 {
            return Err(SortError::Config(
                "run_writer_buffer_bytes must be positive".into(),
            ));
        }
        self.run_writer_buffer_bytes = bytes;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_mem_limit() {
        assert!(EngineConfig::new("/tmp/runs", 0).is_err());
    }

    #[test]
    fn accepts_positive_mem_limit_with_defaults() {
        let cfg = EngineConfig::new("/tmp/runs", 1000).unwrap();
        assert_eq!(cfg.mem_limit_records, 1000);
        assert_eq!(cfg.input_channel_capacity, DEFAULT_INPUT_CHANNEL_CAPACITY);
    }

    #[test]
    fn rejects_zero_channel_capacity() {
        let cfg = EngineConfig::new("/tmp/runs", 1000).unwrap();
        assert!(cfg.with_input_channel_capacity(0).is_err());
    }
}
