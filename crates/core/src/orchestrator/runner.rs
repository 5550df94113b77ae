//! Job orchestrator implementation.
//!
//! Each submitted job gets one driving task that walks the provider list,
//! lists whatever the tool left in the job's working directory and packages
//! it. The task never holds a store lock while the tool runs.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::acquisition::{list_output_files, Acquirer, AcquisitionError};
use crate::job::{new_job_id, JobRecord, JobStatus, JobStore, ProgressEntry, Terminal};
use crate::metrics::{JOBS_FINISHED, JOBS_SUBMITTED, JOB_DURATION, PROVIDER_ATTEMPTS, SONGS_PACKAGED};
use crate::packager::Packager;
use crate::provider::ProviderList;
use crate::reaper::ArtifactCleaner;
use crate::source::normalize_source_url;

use super::config::OrchestratorConfig;
use super::types::{OrchestratorError, Submission};

/// The job orchestrator - drives each job from submission to a terminal state.
///
/// Cloning is cheap; clones share the store and collaborators.
#[derive(Clone)]
pub struct JobOrchestrator {
    config: Arc<OrchestratorConfig>,
    store: Arc<dyn JobStore>,
    acquirer: Arc<dyn Acquirer>,
    packager: Arc<dyn Packager>,
    providers: Arc<ProviderList>,
    cleaner: ArtifactCleaner,
}

impl JobOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: OrchestratorConfig,
        store: Arc<dyn JobStore>,
        acquirer: Arc<dyn Acquirer>,
        packager: Arc<dyn Packager>,
    ) -> Self {
        let providers = ProviderList::new(config.providers.iter().cloned());
        let cleaner = ArtifactCleaner::new(config.storage.clone());

        Self {
            config: Arc::new(config),
            store,
            acquirer,
            packager,
            providers: Arc::new(providers),
            cleaner,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn JobStore> {
        &self.store
    }

    pub fn cleaner(&self) -> &ArtifactCleaner {
        &self.cleaner
    }

    /// Working directory owned by a job.
    pub fn working_dir(&self, job_id: &str) -> PathBuf {
        self.cleaner.working_dir(job_id)
    }

    /// Accept a URL and start driving it in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, url: &str) -> Result<Submission, OrchestratorError> {
        let source_url = normalize_source_url(url)?;
        let job_id = new_job_id();
        self.store.create(&job_id, &source_url)?;
        JOBS_SUBMITTED.inc();
        info!("Accepted job {} for {}", job_id, source_url);

        let orchestrator = self.clone();
        let task_job_id = job_id.clone();
        tokio::spawn(async move {
            orchestrator.drive(&task_job_id, &source_url).await;
        });

        Ok(Submission {
            job_id,
            message: self.config.submission_message(),
        })
    }

    /// Drive one job to a terminal state. Runs once per job.
    pub async fn drive(&self, job_id: &str, url: &str) {
        let start = Instant::now();

        let terminal = match self.run(job_id, url).await {
            Ok(terminal) => terminal,
            Err(OrchestratorError::Abandoned(_)) => {
                info!("Job {} was removed while running; cleaning up", job_id);
                self.discard_artifacts(job_id).await;
                return;
            }
            Err(e) => Terminal::failed(e.to_string()),
        };

        let status = terminal.status();
        if let Terminal::Failed { error } = &terminal {
            warn!("Job {} failed: {}", job_id, error);
        }

        if self.store.set_terminal(job_id, terminal) {
            info!(
                "Job {} finished as {} in {} ms",
                job_id,
                status,
                start.elapsed().as_millis()
            );
            JOBS_FINISHED.with_label_values(&[status.as_str()]).inc();
            JOB_DURATION
                .with_label_values(&[status.as_str()])
                .observe(start.elapsed().as_secs_f64());
        } else if self.store.get(job_id).is_err() {
            // Removed after packaging; nothing will reap what we just wrote.
            info!("Job {} was removed before it finished; cleaning up", job_id);
            self.discard_artifacts(job_id).await;
        } else {
            debug!("Job {} was already terminal", job_id);
        }
    }

    /// Steps up to (not including) the terminal transition.
    async fn run(&self, job_id: &str, url: &str) -> Result<Terminal, OrchestratorError> {
        let source_url = normalize_source_url(url)?;

        if !self.store.mark_running(job_id) && self.store.get(job_id).is_err() {
            return Err(OrchestratorError::Abandoned(job_id.to_string()));
        }
        self.store.append_progress(job_id, ProgressEntry::starting());

        let working_dir = self.working_dir(job_id);
        let credentials = self.config.credentials.as_ref();
        let mut attempted = HashSet::new();
        let mut tried = Vec::new();

        while let Some(provider) = self.providers.next(&attempted) {
            let provider = provider.to_string();
            attempted.insert(provider.clone());

            if !self.store.append_progress(job_id, ProgressEntry::trying(&provider)) {
                return Err(OrchestratorError::Abandoned(job_id.to_string()));
            }
            self.store.record_provider(job_id, &provider);
            tried.push(provider.clone());

            let outcome = match self
                .acquirer
                .attempt(&source_url, &working_dir, &provider, credentials)
                .await
            {
                Ok(0) => {
                    info!("Provider {} produced nothing for job {}", provider, job_id);
                    "empty"
                }
                Ok(count) => {
                    self.store
                        .append_progress(job_id, ProgressEntry::partial_success(&provider, count));
                    PROVIDER_ATTEMPTS
                        .with_label_values(&[provider.as_str(), "success"])
                        .inc();
                    break;
                }
                Err(AcquisitionError::Launch { source, .. }) => {
                    warn!("Provider {} could not start for job {}: {}", provider, job_id, source);
                    self.store.append_progress(
                        job_id,
                        ProgressEntry::launch_failed(&provider, &source.to_string()),
                    );
                    "launch_failed"
                }
                Err(e) => {
                    warn!("Provider {} failed for job {}: {}", provider, job_id, e);
                    "error"
                }
            };
            PROVIDER_ATTEMPTS
                .with_label_values(&[provider.as_str(), outcome])
                .inc();
        }

        let files = match list_output_files(&working_dir, &self.config.output_extension).await {
            Ok(files) => files,
            Err(e) => {
                warn!(
                    "Could not list {} for job {}: {}",
                    working_dir.display(),
                    job_id,
                    e
                );
                Vec::new()
            }
        };

        for file in &files {
            let song = file
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            self.store.append_progress(job_id, ProgressEntry::completed(&song));
        }

        if files.is_empty() {
            return Err(OrchestratorError::AllProvidersExhausted { tried });
        }

        if self.store.get(job_id).is_err() {
            return Err(OrchestratorError::Abandoned(job_id.to_string()));
        }

        let archive_path = self
            .packager
            .package(&files, &self.cleaner.archive_path(job_id))
            .await?;
        SONGS_PACKAGED.inc_by(files.len() as u64);

        Ok(Terminal::Completed {
            song_count: files.len(),
            archive_path,
        })
    }

    async fn discard_artifacts(&self, job_id: &str) {
        if let Err(e) = self.cleaner.remove(job_id).await {
            error!("{}", e);
        }
    }

    /// Current snapshot of a job.
    pub fn status(&self, job_id: &str) -> Result<JobRecord, OrchestratorError> {
        Ok(self.store.get(job_id)?)
    }

    /// Path of a completed job's archive, if it is still on disk.
    pub async fn archive(&self, job_id: &str) -> Result<PathBuf, OrchestratorError> {
        let record = self.store.get(job_id)?;
        if record.status != JobStatus::Completed {
            return Err(OrchestratorError::NotCompleted {
                job_id: job_id.to_string(),
                status: record.status,
            });
        }

        let path = record
            .archive_path
            .unwrap_or_else(|| self.cleaner.archive_path(job_id));
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Ok(path),
            _ => Err(OrchestratorError::ArchiveMissing(job_id.to_string())),
        }
    }

    /// Remove a job's record, working directory and archive.
    ///
    /// A job that is still running notices the removal and stops at its next
    /// step; its tool process is still awaited.
    pub async fn delete(&self, job_id: &str) -> Result<(), OrchestratorError> {
        let record = self.store.delete(job_id)?;
        info!("Deleted job {} ({})", job_id, record.status);
        self.discard_artifacts(job_id).await;
        Ok(())
    }
}
