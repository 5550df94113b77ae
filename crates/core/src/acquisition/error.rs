//! Error types for the acquisition module.

use thiserror::Error;

/// Errors that can occur during one acquisition attempt.
///
/// Producing zero files is not an error; callers read that from the
/// returned file count.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The tool's process could not be started.
    #[error("failed to launch acquisition tool for provider {provider}: {source}")]
    Launch {
        provider: String,
        #[source]
        source: std::io::Error,
    },

    /// The working directory could not be prepared or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AcquisitionError {
    pub fn launch(provider: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            provider: provider.into(),
            source,
        }
    }

    /// Whether the process never started.
    pub fn is_launch(&self) -> bool {
        matches!(self, Self::Launch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_launch_error_display() {
        let err = AcquisitionError::launch(
            "youtube",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert!(err.is_launch());
        assert_eq!(
            err.to_string(),
            "failed to launch acquisition tool for provider youtube: No such file or directory"
        );
    }

    #[test]
    fn test_io_error_is_not_launch() {
        let err = AcquisitionError::from(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        assert!(!err.is_launch());
    }
}
