//! Mock acquirer for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::acquisition::{Acquirer, AcquisitionError};
use crate::config::Credentials;

/// Scripted behavior of one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderScript {
    /// Write these songs (as `<name>.<ext>`) into the working directory.
    Files(Vec<String>),
    /// Fail as if the tool binary were missing.
    LaunchFailure,
    /// Fail while reading the working directory.
    IoFailure,
}

impl ProviderScript {
    pub fn files(names: &[&str]) -> Self {
        Self::Files(names.iter().map(|n| n.to_string()).collect())
    }
}

/// A recorded attempt for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedAttempt {
    pub source_url: String,
    pub working_dir: PathBuf,
    pub provider: String,
    pub had_credentials: bool,
}

/// Mock implementation of the Acquirer trait.
///
/// Providers without a script produce zero files. Scripted files are real
/// files, so the orchestrator's directory listing sees them.
///
/// # Example
///
/// ```rust,ignore
/// use musify_core::testing::{MockAcquirer, ProviderScript};
///
/// let acquirer = MockAcquirer::new();
/// acquirer.script("youtube", ProviderScript::files(&["Song"])).await;
///
/// // Drive a job...
///
/// assert_eq!(acquirer.attempted_providers().await, vec!["youtube-music", "youtube"]);
/// ```
#[derive(Debug)]
pub struct MockAcquirer {
    scripts: Arc<RwLock<HashMap<String, ProviderScript>>>,
    attempts: Arc<RwLock<Vec<RecordedAttempt>>>,
    /// Simulated tool run time.
    delay: Arc<RwLock<Duration>>,
    extension: String,
}

impl Default for MockAcquirer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAcquirer {
    /// Create a mock that writes `.mp3` files.
    pub fn new() -> Self {
        Self::with_extension("mp3")
    }

    pub fn with_extension(extension: &str) -> Self {
        Self {
            scripts: Arc::new(RwLock::new(HashMap::new())),
            attempts: Arc::new(RwLock::new(Vec::new())),
            delay: Arc::new(RwLock::new(Duration::ZERO)),
            extension: extension.to_string(),
        }
    }

    /// Set what a provider does when attempted.
    pub async fn script(&self, provider: &str, script: ProviderScript) {
        self.scripts
            .write()
            .await
            .insert(provider.to_string(), script);
    }

    /// Set how long each attempt takes.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = delay;
    }

    /// Get all recorded attempts.
    pub async fn attempts(&self) -> Vec<RecordedAttempt> {
        self.attempts.read().await.clone()
    }

    /// Providers attempted, in order.
    pub async fn attempted_providers(&self) -> Vec<String> {
        self.attempts
            .read()
            .await
            .iter()
            .map(|a| a.provider.clone())
            .collect()
    }

    async fn write_files(&self, working_dir: &Path, names: &[String]) -> io::Result<usize> {
        tokio::fs::create_dir_all(working_dir).await?;
        let mut written = 0;
        for name in names {
            let path = working_dir.join(format!("{}.{}", name, self.extension));
            if !path.exists() {
                written += 1;
            }
            tokio::fs::write(&path, name.as_bytes()).await?;
        }
        Ok(written)
    }
}

#[async_trait]
impl Acquirer for MockAcquirer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn attempt(
        &self,
        source_url: &str,
        working_dir: &Path,
        provider: &str,
        credentials: Option<&Credentials>,
    ) -> Result<usize, AcquisitionError> {
        self.attempts.write().await.push(RecordedAttempt {
            source_url: source_url.to_string(),
            working_dir: working_dir.to_path_buf(),
            provider: provider.to_string(),
            had_credentials: credentials.is_some_and(Credentials::is_complete),
        });

        let delay = *self.delay.read().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let script = self.scripts.read().await.get(provider).cloned();
        match script {
            None => Ok(0),
            Some(ProviderScript::Files(names)) => Ok(self.write_files(working_dir, &names).await?),
            Some(ProviderScript::LaunchFailure) => Err(AcquisitionError::launch(
                provider,
                io::Error::new(io::ErrorKind::NotFound, "mock tool not found"),
            )),
            Some(ProviderScript::IoFailure) => Err(AcquisitionError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock listing failure",
            ))),
        }
    }
}
