//! Error taxonomy for the sort engine.
//!
//! Library code returns `SortError` so callers can match on failure class;
//! the CLI boundary wraps these with `anyhow::Context` for human-readable
//! diagnostics before printing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SortError {
    #[error("io error during {phase} at {path:?}: {source}")]
    Io {
        phase: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input channel closed before producer signaled completion")]
    ChannelClosedEarly,

    #[error("output sink rejected a line during merge[{key}]: {source}")]
    Handler {
        key: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SortError {
    pub fn io(phase: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SortError::Io {
            phase,
            path: path.into(),
            source,
        }
    }
}
