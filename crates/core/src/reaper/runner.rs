//! Reaper loop implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::RetentionConfig;
use crate::job::JobStore;
use crate::metrics::{EVICTION_FAILURES, JOBS_EVICTED};

use super::cleaner::ArtifactCleaner;

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records removed from the store.
    pub evicted: usize,
    /// Jobs whose artifacts could not be fully removed.
    pub failed: usize,
}

/// Periodically evicts jobs older than the retention window.
///
/// Eviction is unconditional: running jobs are removed too, and their
/// drivers clean up after themselves once they notice.
pub struct Reaper {
    store: Arc<dyn JobStore>,
    cleaner: ArtifactCleaner,
    config: RetentionConfig,

    // Runtime state
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Reaper {
    pub fn new(store: Arc<dyn JobStore>, cleaner: ArtifactCleaner, config: RetentionConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            store,
            cleaner,
            config,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            handle: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Start the sweep loop (spawns a background task).
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Reaper already running");
            return;
        }

        let running = Arc::clone(&self.running);
        let store = Arc::clone(&self.store);
        let cleaner = self.cleaner.clone();
        let window = self.config.window();
        let interval = self.config.sweep_interval();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        info!(
            "Starting reaper (retention {}s, sweep every {}s)",
            window.as_secs(),
            interval.as_secs()
        );

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Reaper received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        Self::sweep_once(store.as_ref(), &cleaner, window).await;
                    }
                }
            }
            info!("Reaper stopped");
        });

        *self.handle.lock().await = Some(handle);
    }

    /// Signal shutdown and wait for the loop to exit.
    ///
    /// A sweep in progress finishes before the loop sees the signal.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Reaper not running");
            return;
        }

        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                warn!("Reaper task ended abnormally: {}", e);
            }
        }
    }

    /// Run one sweep now.
    pub async fn sweep(&self) -> SweepReport {
        Self::sweep_once(self.store.as_ref(), &self.cleaner, self.config.window()).await
    }

    async fn sweep_once(store: &dyn JobStore, cleaner: &ArtifactCleaner, window: Duration) -> SweepReport {
        let mut report = SweepReport::default();
        let expired = store.list_ids_older_than(window);
        if expired.is_empty() {
            return report;
        }
        debug!("Sweeping {} expired job(s)", expired.len());

        for job_id in expired {
            // Record first: a driver still packaging this job then finds it
            // gone and removes whatever it writes afterwards.
            if store.delete(&job_id).is_err() {
                // An explicit delete got here first and cleaned up.
                continue;
            }
            report.evicted += 1;
            JOBS_EVICTED.inc();

            if let Err(e) = cleaner.remove(&job_id).await {
                warn!("{}", e);
                report.failed += 1;
                EVICTION_FAILURES.inc();
            } else {
                info!("Evicted job {}", job_id);
            }
        }

        report
    }
}
