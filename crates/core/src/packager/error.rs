//! Error types for the packager module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building an archive.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// None of the given files could be added.
    #[error("no files to package")]
    Empty,

    /// Writing the archive failed.
    #[error("failed to write archive {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    /// I/O error while reading inputs or preparing the output directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking packaging task did not finish.
    #[error("packaging task failed: {0}")]
    TaskFailed(String),
}

impl PackagerError {
    pub fn write_failed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::WriteFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
