//! Trait definitions for the acquisition module.

use async_trait::async_trait;
use std::path::Path;

use super::error::AcquisitionError;
use crate::config::Credentials;

/// Runs one acquisition attempt against one provider.
#[async_trait]
pub trait Acquirer: Send + Sync {
    /// Returns the name of this acquirer implementation.
    fn name(&self) -> &str;

    /// Fetch `source_url` into `working_dir` using `provider`.
    ///
    /// Returns how many new output files appeared in `working_dir`. The count
    /// is a before/after delta, so files left by earlier providers are not
    /// counted again.
    async fn attempt(
        &self,
        source_url: &str,
        working_dir: &Path,
        provider: &str,
        credentials: Option<&Credentials>,
    ) -> Result<usize, AcquisitionError>;
}
