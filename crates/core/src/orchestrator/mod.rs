//! Job orchestrator.
//!
//! Drives each job through `pending -> running -> {completed, failed}`:
//! providers are tried in preference order until one yields files, the
//! working directory is listed as ground truth, and the files are packaged.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::JobOrchestrator;
pub use types::{OrchestratorError, Submission};
