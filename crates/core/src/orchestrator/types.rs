//! Types for the job orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::job::{JobStatus, JobStoreError};
use crate::packager::PackagerError;
use crate::source::SourceError;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The submitted URL was rejected.
    #[error("{0}")]
    InvalidInput(#[from] SourceError),

    /// Job not found.
    #[error("job not found: {0}")]
    NotFound(String),

    /// The job has no archive yet.
    #[error("job {job_id} is {status}, not completed")]
    NotCompleted { job_id: String, status: JobStatus },

    /// The job completed but its archive is gone from disk.
    #[error("archive missing for job {0}")]
    ArchiveMissing(String),

    /// Every provider ran and none produced a file.
    #[error("all providers exhausted: {}", .tried.join(", "))]
    AllProvidersExhausted { tried: Vec<String> },

    /// Packaging error.
    #[error("packaging failed: {0}")]
    Packaging(#[from] PackagerError),

    /// The record vanished while the job was being driven.
    #[error("job {0} was removed while running")]
    Abandoned(String),

    /// Job store error.
    #[error("job store error: {0}")]
    Store(JobStoreError),
}

impl From<JobStoreError> for OrchestratorError {
    fn from(err: JobStoreError) -> Self {
        match err {
            JobStoreError::NotFound(id) => OrchestratorError::NotFound(id),
            other => OrchestratorError::Store(other),
        }
    }
}

/// Acknowledgement returned when a job is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub job_id: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrchestratorError::from(SourceError::Invalid);
        assert_eq!(err.to_string(), "invalid source URL");

        let err = OrchestratorError::AllProvidersExhausted {
            tried: vec!["youtube-music".to_string(), "youtube".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "all providers exhausted: youtube-music, youtube"
        );

        let err = OrchestratorError::NotCompleted {
            job_id: "job-1".to_string(),
            status: JobStatus::Running,
        };
        assert_eq!(err.to_string(), "job job-1 is running, not completed");
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err = OrchestratorError::from(JobStoreError::NotFound("job-9".to_string()));
        assert!(matches!(err, OrchestratorError::NotFound(id) if id == "job-9"));

        let err = OrchestratorError::from(JobStoreError::DuplicateJob("job-9".to_string()));
        assert!(matches!(err, OrchestratorError::Store(_)));
    }

    #[test]
    fn test_submission_serialization() {
        let submission = Submission {
            job_id: "job-1".to_string(),
            message: "Download started.".to_string(),
        };
        let json = serde_json::to_value(&submission).unwrap();
        assert_eq!(json["job_id"], "job-1");
        assert_eq!(json["message"], "Download started.");
    }
}
