//! Mock packager for testing.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::packager::{Packager, PackagerError};

/// A recorded packaging call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedPackage {
    pub files: Vec<PathBuf>,
    pub archive_path: PathBuf,
    pub success: bool,
}

/// Mock implementation of the Packager trait.
///
/// Writes a plain-text manifest of file names at the archive path instead of
/// a real ZIP, so archive existence checks behave as in production.
#[derive(Debug)]
pub struct MockPackager {
    packages: Arc<RwLock<Vec<RecordedPackage>>>,
    should_fail: Arc<RwLock<bool>>,
    /// Pause between recording a call and writing the archive.
    delay: Arc<RwLock<Duration>>,
}

impl Default for MockPackager {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPackager {
    pub fn new() -> Self {
        Self {
            packages: Arc::new(RwLock::new(Vec::new())),
            should_fail: Arc::new(RwLock::new(false)),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Make every subsequent call fail.
    pub async fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().await = fail;
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    pub async fn recorded_packages(&self) -> Vec<RecordedPackage> {
        self.packages.read().await.clone()
    }

    /// Number of successful packaging calls.
    pub async fn packaged_count(&self) -> usize {
        self.packages
            .read()
            .await
            .iter()
            .filter(|p| p.success)
            .count()
    }
}

#[async_trait]
impl Packager for MockPackager {
    fn name(&self) -> &str {
        "mock"
    }

    async fn package(
        &self,
        files: &[PathBuf],
        archive_path: &Path,
    ) -> Result<PathBuf, PackagerError> {
        let fail = *self.should_fail.read().await;
        self.packages.write().await.push(RecordedPackage {
            files: files.to_vec(),
            archive_path: archive_path.to_path_buf(),
            success: !fail,
        });

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if fail {
            return Err(PackagerError::write_failed(archive_path, "mock failure"));
        }
        if files.is_empty() {
            return Err(PackagerError::Empty);
        }

        if let Some(parent) = archive_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let manifest: Vec<String> = files
            .iter()
            .filter_map(|f| f.file_name().map(|n| n.to_string_lossy().to_string()))
            .collect();
        tokio::fs::write(archive_path, manifest.join("\n")).await?;
        Ok(archive_path.to_path_buf())
    }
}
