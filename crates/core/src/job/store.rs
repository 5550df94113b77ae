//! Job storage trait and errors.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::types::{JobRecord, ProgressEntry, ProgressSlice, Terminal};

/// Error type for job store operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobStoreError {
    /// No record exists for the identifier.
    #[error("job not found: {0}")]
    NotFound(String),

    /// A record with this identifier already exists.
    #[error("duplicate job id: {0}")]
    DuplicateJob(String),
}

/// Concurrency-safe mapping from job id to job record.
///
/// Mutations against a missing record are no-ops returning `false`, so a
/// driver racing with deletion never fails.
pub trait JobStore: Send + Sync {
    /// Create a record with an explicit creation time.
    fn create_at(
        &self,
        id: &str,
        source_url: &str,
        created_at: DateTime<Utc>,
    ) -> Result<JobRecord, JobStoreError>;

    /// Create a record stamped with the current time.
    fn create(&self, id: &str, source_url: &str) -> Result<JobRecord, JobStoreError> {
        self.create_at(id, source_url, Utc::now())
    }

    /// Snapshot of a record.
    fn get(&self, id: &str) -> Result<JobRecord, JobStoreError>;

    /// Progress entries from `cursor` onward, read atomically with the status.
    fn progress_since(&self, id: &str, cursor: usize) -> Result<ProgressSlice, JobStoreError>;

    /// `Pending -> Running`.
    fn mark_running(&self, id: &str) -> bool;

    /// Append one progress entry.
    fn append_progress(&self, id: &str, entry: ProgressEntry) -> bool;

    /// Remember that a provider was attempted.
    fn record_provider(&self, id: &str, provider: &str) -> bool;

    /// Transition to a terminal state. Idempotent once terminal.
    fn set_terminal(&self, id: &str, terminal: Terminal) -> bool;

    /// Remove a record, returning its last state.
    fn delete(&self, id: &str) -> Result<JobRecord, JobStoreError>;

    /// Ids of records older than `age`.
    fn list_ids_older_than(&self, age: Duration) -> Vec<String>;

    /// Number of records held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
