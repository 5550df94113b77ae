//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Orchestrator (submissions, provider attempts, job outcomes)
//! - Packaging
//! - Reaper (evictions)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Jobs accepted for processing.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("musify_jobs_submitted_total", "Total jobs submitted").unwrap()
});

/// Jobs that reached a terminal state.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("musify_jobs_finished_total", "Total jobs finished"),
        &["result"], // "completed", "failed"
    )
    .unwrap()
});

/// Wall time from driver start to terminal state.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("musify_job_duration_seconds", "Duration of a job")
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["result"],
    )
    .unwrap()
});

/// Provider attempts by outcome.
pub static PROVIDER_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "musify_provider_attempts_total",
            "Total acquisition attempts per provider",
        ),
        &["provider", "outcome"], // outcome: "success", "empty", "launch_failed", "error"
    )
    .unwrap()
});

// =============================================================================
// Packaging Metrics
// =============================================================================

/// Files written into archives.
pub static SONGS_PACKAGED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("musify_songs_packaged_total", "Total files packaged").unwrap()
});

// =============================================================================
// Reaper Metrics
// =============================================================================

/// Jobs removed by the reaper.
pub static JOBS_EVICTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("musify_jobs_evicted_total", "Total jobs evicted").unwrap()
});

/// Evictions whose artifacts could not be fully removed.
pub static EVICTION_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "musify_eviction_failures_total",
        "Total evictions with artifact cleanup errors",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Orchestrator
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(PROVIDER_ATTEMPTS.clone()),
        // Packaging
        Box::new(SONGS_PACKAGED.clone()),
        // Reaper
        Box::new(JOBS_EVICTED.clone()),
        Box::new(EVICTION_FAILURES.clone()),
    ]
}
