//! Trait definitions for the packager module.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::PackagerError;

/// Packs a job's output files into a single archive.
#[async_trait]
pub trait Packager: Send + Sync {
    /// Returns the name of this packager implementation.
    fn name(&self) -> &str;

    /// Write `files` into a new archive at `archive_path`.
    ///
    /// Entries are stored flat under their file names. On failure no archive
    /// is left behind.
    async fn package(&self, files: &[PathBuf], archive_path: &Path)
        -> Result<PathBuf, PackagerError>;
}
