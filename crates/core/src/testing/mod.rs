//! Test doubles for the acquisition and packaging seams.
//!
//! Both mocks touch the real filesystem so that directory listing, archive
//! existence checks and cleanup behave as they do in production.
//!
//! # Example
//!
//! ```rust,ignore
//! use musify_core::testing::{MockAcquirer, MockPackager, ProviderScript};
//!
//! let acquirer = MockAcquirer::new();
//! acquirer.script("youtube-music", ProviderScript::LaunchFailure).await;
//! acquirer.script("youtube", ProviderScript::files(&["Song"])).await;
//! let packager = MockPackager::new();
//! ```

mod mock_acquirer;
mod mock_packager;

pub use mock_acquirer::{MockAcquirer, ProviderScript, RecordedAttempt};
pub use mock_packager::{MockPackager, RecordedPackage};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::Path;
    use std::time::Duration;

    use crate::config::StorageConfig;
    use crate::job::{JobRecord, JobStore};

    pub const PLAYLIST_URL: &str = "https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M";
    pub const ALBUM_URL: &str = "https://open.spotify.com/album/4aawyAB9vmqN3uQ7FjRGTy";

    /// Storage rooted in a temporary directory.
    pub fn storage_in(root: &Path) -> StorageConfig {
        StorageConfig {
            downloads_dir: root.join("downloads"),
            archives_dir: root.join("zips"),
        }
    }

    /// Poll the store until the job is terminal or gone.
    ///
    /// Returns the last snapshot, or `None` if the record disappeared or the
    /// job did not finish in time.
    pub async fn wait_for_terminal(
        store: &dyn JobStore,
        job_id: &str,
        timeout: Duration,
    ) -> Option<JobRecord> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match store.get(job_id) {
                Ok(record) if record.status.is_terminal() => return Some(record),
                Ok(_) => {}
                Err(_) => return None,
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}
