//! Job API handlers.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::info;

use musify_core::publisher::download_url;
use musify_core::{JobRecord, JobStatus, OrchestratorError, ProgressEntry, Submission};

use super::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for submitting a download
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
}

/// Snapshot of a job as returned by the status route
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub progress: Vec<ProgressEntry>,
    pub song_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<JobRecord> for JobStatusResponse {
    fn from(record: JobRecord) -> Self {
        let download_url = (record.status == JobStatus::Completed).then(|| download_url(&record.id));
        Self {
            job_id: record.id,
            status: record.status,
            progress: record.progress_log,
            song_count: record.song_count,
            download_url,
            error: record.error,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a URL for download
pub async fn submit_download(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DownloadRequest>,
) -> Result<Json<Submission>, ApiError> {
    let submission = state.orchestrator().submit(body.url.trim())?;
    Ok(Json(submission))
}

/// Get a job's status and progress log
pub async fn job_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let record = state.orchestrator().status(&job_id)?;
    Ok(Json(JobStatusResponse::from(record)))
}

/// Stream a completed job's archive
pub async fn download_archive(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let path = state.orchestrator().archive(&job_id).await?;

    // The reaper may remove the file between the check and the open.
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| ApiError::from(OrchestratorError::ArchiveMissing(job_id.clone())))?;
    let length = file.metadata().await.ok().map(|m| m.len());

    let disposition = format!("attachment; filename=\"{}.zip\"", job_id);
    let mut response = (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response();

    if let Some(length) = length {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, length.into());
    }

    Ok(response)
}

/// Delete a job and its files
pub async fn delete_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.orchestrator().delete(&job_id).await?;
    info!("Job {} cleaned up on request", job_id);
    Ok(Json(MessageResponse {
        message: "Job cleaned up".to_string(),
    }))
}
