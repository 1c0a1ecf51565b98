//! Error types for rulectl-fs

use std::path::PathBuf;

use crate::config::Format;

/// Result type for rulectl-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rulectl-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} file at {path}: {message}")]
    Parse {
        path: PathBuf,
        format: Format,
        message: String,
    },

    #[error("Failed to serialize {format} to {path}: {message}")]
    Serialize {
        path: PathBuf,
        format: Format,
        message: String,
    },

    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Another process holds the lock and the caller asked not to wait.
    #[error("Lock is held by another process: {path}")]
    LockHeld { path: PathBuf },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
