//! Error types for traces-reader

use thiserror::Error;

/// Result type alias for traces-reader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the edges: files, configuration documents, terminal output
///
/// Steady-state highlighting never fails; bad patterns and unmatched paths
/// degrade to fewer highlights instead of surfacing here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid settings file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),
}
