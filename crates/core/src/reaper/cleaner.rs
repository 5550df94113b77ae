//! Removal of a job's on-disk artifacts.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::StorageConfig;

/// One or more artifacts of a job could not be removed.
#[derive(Debug, Error)]
#[error("failed to remove artifacts of job {job_id}: {}", .failures.join("; "))]
pub struct CleanupError {
    pub job_id: String,
    pub failures: Vec<String>,
}

/// Deletes a job's working directory and archive.
///
/// Removing something that is already gone counts as success, so the reaper,
/// explicit deletion and an abandoned driver can all clean the same job.
#[derive(Debug, Clone, Default)]
pub struct ArtifactCleaner {
    storage: StorageConfig,
}

impl ArtifactCleaner {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }

    pub fn working_dir(&self, job_id: &str) -> PathBuf {
        self.storage.working_dir(job_id)
    }

    pub fn archive_path(&self, job_id: &str) -> PathBuf {
        self.storage.archive_path(job_id)
    }

    /// Remove both artifacts, attempting each even if the other fails.
    pub async fn remove(&self, job_id: &str) -> Result<(), CleanupError> {
        let mut failures = Vec::new();

        let working_dir = self.working_dir(job_id);
        if let Err(e) = ignore_missing(tokio::fs::remove_dir_all(&working_dir).await, &working_dir) {
            failures.push(format!("{}: {}", working_dir.display(), e));
        }

        let archive = self.archive_path(job_id);
        if let Err(e) = ignore_missing(tokio::fs::remove_file(&archive).await, &archive) {
            failures.push(format!("{}: {}", archive.display(), e));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CleanupError {
                job_id: job_id.to_string(),
                failures,
            })
        }
    }
}

fn ignore_missing(result: io::Result<()>, path: &Path) -> io::Result<()> {
    match result {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cleaner(root: &Path) -> ArtifactCleaner {
        ArtifactCleaner::new(StorageConfig {
            downloads_dir: root.join("downloads"),
            archives_dir: root.join("zips"),
        })
    }

    #[tokio::test]
    async fn test_remove_both_artifacts() {
        let root = TempDir::new().unwrap();
        let cleaner = cleaner(root.path());
        let working_dir = cleaner.working_dir("job-1");
        std::fs::create_dir_all(&working_dir).unwrap();
        std::fs::write(working_dir.join("song.mp3"), b"x").unwrap();
        std::fs::create_dir_all(root.path().join("zips")).unwrap();
        std::fs::write(cleaner.archive_path("job-1"), b"zip").unwrap();

        cleaner.remove("job-1").await.unwrap();
        assert!(!working_dir.exists());
        assert!(!cleaner.archive_path("job-1").exists());
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let root = TempDir::new().unwrap();
        tokio_test::assert_ok!(cleaner(root.path()).remove("never-existed").await);
    }

    #[tokio::test]
    async fn test_failure_still_removes_archive() {
        let root = TempDir::new().unwrap();
        let cleaner = cleaner(root.path());
        // A plain file where the working directory should be cannot be
        // removed as a directory.
        std::fs::create_dir_all(root.path().join("downloads")).unwrap();
        std::fs::write(cleaner.working_dir("job-1"), b"not a dir").unwrap();
        std::fs::create_dir_all(root.path().join("zips")).unwrap();
        std::fs::write(cleaner.archive_path("job-1"), b"zip").unwrap();

        let err = cleaner.remove("job-1").await.unwrap_err();
        assert_eq!(err.job_id, "job-1");
        assert_eq!(err.failures.len(), 1);
        assert!(!cleaner.archive_path("job-1").exists());
    }
}
