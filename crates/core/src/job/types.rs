//! Core job data types.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mint a new job identifier.
pub fn new_job_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Lifecycle status of a job.
///
/// `Pending -> Running -> {Completed, Failed}`. A job that fails URL
/// validation goes straight from `Pending` to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Whether no further transitions can happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase named by a progress entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressPhase {
    /// The job started running.
    Starting,
    /// A provider attempt is about to run.
    Trying,
    /// A provider produced at least one file.
    PartialSuccess,
    /// A provider's process could not be started.
    LaunchFailed,
    /// One output file is ready.
    Completed,
}

/// One immutable, ordered record of job advancement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    /// What the entry is about (a provider or a song); empty for job-level entries.
    pub label: String,
    pub phase: ProgressPhase,
    /// Human readable message.
    pub detail: String,
}

impl ProgressEntry {
    pub fn new(label: impl Into<String>, phase: ProgressPhase, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            phase,
            detail: detail.into(),
        }
    }

    pub fn starting() -> Self {
        Self::new("", ProgressPhase::Starting, "Starting...")
    }

    pub fn trying(provider: &str) -> Self {
        Self::new(
            provider,
            ProgressPhase::Trying,
            format!("Trying provider {}", provider),
        )
    }

    pub fn partial_success(provider: &str, count: usize) -> Self {
        Self::new(
            provider,
            ProgressPhase::PartialSuccess,
            format!("Provider {} downloaded {} file(s)", provider, count),
        )
    }

    pub fn launch_failed(provider: &str, reason: &str) -> Self {
        Self::new(
            provider,
            ProgressPhase::LaunchFailed,
            format!("Provider {} unavailable: {}", provider, reason),
        )
    }

    pub fn completed(song: &str) -> Self {
        Self::new(song, ProgressPhase::Completed, format!("Downloaded: {}", song))
    }
}

/// Outcome recorded when a job reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Completed {
        song_count: usize,
        archive_path: PathBuf,
    },
    Failed {
        error: String,
    },
}

impl Terminal {
    pub fn failed(error: impl Into<String>) -> Self {
        Terminal::Failed {
            error: error.into(),
        }
    }

    pub fn status(&self) -> JobStatus {
        match self {
            Terminal::Completed { .. } => JobStatus::Completed,
            Terminal::Failed { .. } => JobStatus::Failed,
        }
    }
}

/// The state of one submitted URL.
///
/// Stores hand out clones of this; nobody outside the store holds the live
/// record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    /// Normalized source URL (query parameters stripped).
    pub source_url: String,
    /// Append-only; insertion order is replay order.
    pub progress_log: Vec<ProgressEntry>,
    pub song_count: usize,
    /// Set only when `status` is `Failed`.
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set only when `status` is `Completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<PathBuf>,
    /// Providers attempted, in order.
    #[serde(default)]
    pub providers_tried: Vec<String>,
}

impl JobRecord {
    pub fn new(id: impl Into<String>, source_url: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Pending,
            source_url: source_url.into(),
            progress_log: Vec::new(),
            song_count: 0,
            error: None,
            created_at,
            archive_path: None,
            providers_tried: Vec::new(),
        }
    }

    /// `Pending -> Running`. Returns false for any other starting state.
    pub fn mark_running(&mut self) -> bool {
        if self.status != JobStatus::Pending {
            return false;
        }
        self.status = JobStatus::Running;
        true
    }

    /// Move to a terminal state. A second call is a no-op returning false.
    pub fn finish(&mut self, terminal: Terminal) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = terminal.status();
        match terminal {
            Terminal::Completed {
                song_count,
                archive_path,
            } => {
                self.song_count = song_count;
                self.archive_path = Some(archive_path);
                self.error = None;
            }
            Terminal::Failed { error } => {
                self.error = Some(error);
                self.archive_path = None;
            }
        }
        true
    }

    /// Whether this record was created before `cutoff`.
    pub fn created_before(&self, cutoff: DateTime<Utc>) -> bool {
        self.created_at < cutoff
    }
}

/// Entries appended after a cursor, read together with the job's status.
#[derive(Debug, Clone)]
pub struct ProgressSlice {
    pub entries: Vec<ProgressEntry>,
    /// Cursor to pass on the next read.
    pub next_cursor: usize,
    pub status: JobStatus,
    pub song_count: usize,
    pub error: Option<String>,
}
