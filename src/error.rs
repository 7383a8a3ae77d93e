//! Error types for the media index

use std::path::PathBuf;
use thiserror::Error;

/// Error kinds that can occur during indexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexErrorKind {
    /// Permission denied when accessing a file or directory
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// I/O error during file operations
    IoError,
    /// Frame-extraction process could not be spawned
    SpawnFailed,
    /// Frame-extraction process exited with a non-zero status
    ExtractionFailed,
    /// Frame-extraction process exceeded its time budget
    ExtractionTimeout,
    /// Cache document could not be written
    Persistence,
}

/// Represents an error recovered during an index operation
#[derive(Debug, Error)]
#[error("{kind:?}: {message} (path: {path:?})")]
pub struct IndexError {
    /// The kind of error
    pub kind: IndexErrorKind,
    /// The path where the error occurred
    pub path: Option<PathBuf>,
    /// Human-readable error message
    pub message: String,
}

impl IndexError {
    /// Create a new index error
    pub fn new(kind: IndexErrorKind, path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(path: PathBuf) -> Self {
        Self::new(
            IndexErrorKind::NotFound,
            Some(path.clone()),
            format!("Not found: {:?}", path),
        )
    }

    /// Create an I/O error
    pub fn io_error(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        Self::new(IndexErrorKind::IoError, path, message)
    }

    /// Create a spawn failure error
    pub fn spawn_failed(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(IndexErrorKind::SpawnFailed, Some(path), message)
    }

    /// Create an extraction failure error
    pub fn extraction_failed(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(IndexErrorKind::ExtractionFailed, Some(path), message)
    }

    /// Create an extraction timeout error
    pub fn extraction_timeout(path: PathBuf) -> Self {
        Self::new(
            IndexErrorKind::ExtractionTimeout,
            Some(path),
            "frame extraction timed out",
        )
    }

    /// Create a persistence error
    pub fn persistence(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(IndexErrorKind::Persistence, Some(path), message)
    }
}

impl From<std::io::Error> for IndexError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => IndexErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => IndexErrorKind::NotFound,
            _ => IndexErrorKind::IoError,
        };
        Self::new(kind, None, err.to_string())
    }
}
