//! External multi-key sort engine.
//!
//! Ingests a stream of `id,name,address,continent` lines, buffers them under
//! three independent sort orders, spills full buffers to disk as sorted run
//! files, then merges each key's runs into a single globally sorted stream.

pub mod buffer;
pub mod config;
pub mod error;
pub mod input;
pub mod key;
pub mod merger;
pub mod orchestrator;
pub mod run_file;
pub mod run_generator;

pub use config::EngineConfig;
pub use error::SortError;
pub use key::KeyKind;
pub use orchestrator::{run, Sinks};
