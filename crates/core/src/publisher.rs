//! Live progress feed for a single job.
//!
//! Subscribers get every progress entry in append order, then one terminal
//! summary. The feed polls the store with a cursor, so a subscriber that
//! connects late still replays the whole log.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;
use tracing::debug;

use crate::config::PublisherConfig;
use crate::job::{JobStatus, JobStore, ProgressEntry, ProgressSlice};

/// Route at which a completed job's archive is served.
pub fn download_url(job_id: &str) -> String {
    format!("/api/download/{}/zip", job_id)
}

/// Final message of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerminalSummary {
    pub status: JobStatus,
    pub song_count: usize,
    pub download_url: Option<String>,
    pub error: Option<String>,
}

impl TerminalSummary {
    fn from_slice(job_id: &str, slice: &ProgressSlice) -> Self {
        let completed = slice.status == JobStatus::Completed;
        Self {
            status: slice.status,
            song_count: slice.song_count,
            download_url: completed.then(|| download_url(job_id)),
            error: slice.error.clone(),
        }
    }
}

/// One message of a job's feed, serialized as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PublisherMessage {
    Progress(ProgressEntry),
    Terminal(TerminalSummary),
    NotFound { error: String },
}

impl PublisherMessage {
    pub fn not_found() -> Self {
        PublisherMessage::NotFound {
            error: "job not found".to_string(),
        }
    }

    /// Whether the feed ends after this message.
    pub fn is_final(&self) -> bool {
        !matches!(self, PublisherMessage::Progress(_))
    }
}

struct FeedState {
    store: Arc<dyn JobStore>,
    job_id: String,
    poll_interval: Duration,
    cursor: usize,
    pending: VecDeque<PublisherMessage>,
    polled: bool,
    finished: bool,
}

impl FeedState {
    /// Read everything past the cursor and queue the resulting messages.
    fn poll_store(&mut self) {
        match self.store.progress_since(&self.job_id, self.cursor) {
            Ok(slice) => {
                self.cursor = slice.next_cursor;
                self.pending.extend(
                    slice
                        .entries
                        .iter()
                        .cloned()
                        .map(PublisherMessage::Progress),
                );
                if slice.status.is_terminal() {
                    self.pending.push_back(PublisherMessage::Terminal(
                        TerminalSummary::from_slice(&self.job_id, &slice),
                    ));
                    self.finished = true;
                }
            }
            Err(_) => {
                debug!("Job {} is gone; ending feed", self.job_id);
                self.pending.push_back(PublisherMessage::not_found());
                self.finished = true;
            }
        }
    }
}

/// Streams job progress to any number of independent subscribers.
#[derive(Clone)]
pub struct ProgressPublisher {
    store: Arc<dyn JobStore>,
    poll_interval: Duration,
}

impl ProgressPublisher {
    pub fn new(store: Arc<dyn JobStore>, config: &PublisherConfig) -> Self {
        Self {
            store,
            poll_interval: config.poll_interval(),
        }
    }

    /// Feed for one job. Ends after the terminal summary or a not-found
    /// message; dropping it early has no effect on the job.
    pub fn subscribe(&self, job_id: &str) -> BoxStream<'static, PublisherMessage> {
        let state = FeedState {
            store: Arc::clone(&self.store),
            job_id: job_id.to_string(),
            poll_interval: self.poll_interval,
            cursor: 0,
            pending: VecDeque::new(),
            polled: false,
            finished: false,
        };

        stream::unfold(state, |mut state| async move {
            loop {
                if let Some(message) = state.pending.pop_front() {
                    return Some((message, state));
                }
                if state.finished {
                    return None;
                }
                if state.polled {
                    tokio::time::sleep(state.poll_interval).await;
                }
                state.polled = true;
                state.poll_store();
            }
        })
        .boxed()
    }
}
