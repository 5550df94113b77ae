//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

use crate::config::{Config, Credentials, StorageConfig};

/// Settings the orchestrator reads while driving jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Where working directories and archives live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Providers in preference order.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    /// Extension of files counted as output.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Process-wide client credentials handed to every attempt.
    #[serde(default)]
    pub credentials: Option<Credentials>,

    /// Retention window announced to submitters (seconds).
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

fn default_providers() -> Vec<String> {
    vec!["youtube-music".to_string(), "youtube".to_string()]
}

fn default_output_extension() -> String {
    "mp3".to_string()
}

fn default_retention_secs() -> u64 {
    1800 // 30 minutes
}

impl OrchestratorConfig {
    /// Collect the orchestrator's view of the service configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            storage: config.storage.clone(),
            providers: config.acquisition.providers.clone(),
            output_extension: config.acquisition.output_extension.clone(),
            credentials: config.acquisition.credentials.clone(),
            retention_secs: config.retention.window_secs,
        }
    }

    /// Message returned to submitters.
    pub fn submission_message(&self) -> String {
        format!(
            "Download started. Files auto-delete after {} minutes.",
            self.retention_secs / 60
        )
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            providers: default_providers(),
            output_extension: default_output_extension(),
            credentials: None,
            retention_secs: default_retention_secs(),
        }
    }
}
