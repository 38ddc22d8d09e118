//! Error types for card tooling
//!
//! These cover operational failures (config, I/O, export). Validation
//! findings are never errors; they are [`crate::ValidationError`] values.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for card operations
pub type Result<T> = std::result::Result<T, CardError>;

/// Card tooling errors
#[derive(Error, Debug)]
pub enum CardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Invalid id pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("{file} has {count} validation error(s); refusing to export")]
    InvalidCards { file: PathBuf, count: usize },

    #[error("Duplicate card id {id} in {first} and {second}")]
    DuplicateAcrossCorpus {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Input directory not found: {0}")]
    NoInput(PathBuf),
}
