use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8000
}

/// Where job artifacts live on disk.
///
/// Every job gets `downloads_dir/<job_id>/` as its working directory and
/// `archives_dir/<job_id>.zip` as its archive.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: PathBuf,
    #[serde(default = "default_archives_dir")]
    pub archives_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            downloads_dir: default_downloads_dir(),
            archives_dir: default_archives_dir(),
        }
    }
}

impl StorageConfig {
    /// Working directory owned by a single job.
    pub fn working_dir(&self, job_id: &str) -> PathBuf {
        self.downloads_dir.join(job_id)
    }

    /// Archive produced for a completed job.
    pub fn archive_path(&self, job_id: &str) -> PathBuf {
        self.archives_dir.join(format!("{}.zip", job_id))
    }
}

fn default_downloads_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_archives_dir() -> PathBuf {
    PathBuf::from("zips")
}

/// External acquisition tool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AcquisitionConfig {
    /// Path to the spotdl binary.
    #[serde(default = "default_tool_path")]
    pub tool_path: PathBuf,

    /// Providers to try, in order of preference.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    /// Extension of the files the tool produces (without the dot).
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Upper bound for a single provider attempt in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Optional client credential pair passed to every attempt.
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            tool_path: default_tool_path(),
            providers: default_providers(),
            output_extension: default_output_extension(),
            timeout_secs: default_timeout(),
            credentials: None,
        }
    }
}

impl AcquisitionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_tool_path() -> PathBuf {
    PathBuf::from("spotdl")
}

fn default_providers() -> Vec<String> {
    vec!["youtube-music".to_string(), "youtube".to_string()]
}

fn default_output_extension() -> String {
    "mp3".to_string()
}

fn default_timeout() -> u64 {
    1800 // 30 minutes
}

/// Client credential pair for the acquisition tool.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
}

impl Credentials {
    /// Both halves must be present for the pair to be usable.
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Time-based eviction of jobs and their artifacts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    /// Age after which any job is evicted, regardless of status.
    #[serde(default = "default_window")]
    pub window_secs: u64,

    /// How often the reaper sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

impl RetentionConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn default_window() -> u64 {
    1800 // 30 minutes
}

fn default_sweep_interval() -> u64 {
    60
}

/// Progress publisher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublisherConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl PublisherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_poll_interval() -> u64 {
    500
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub acquisition: SanitizedAcquisitionConfig,
    pub retention: RetentionConfig,
    pub publisher: PublisherConfig,
}

/// Acquisition config with the credential pair hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAcquisitionConfig {
    pub tool_path: PathBuf,
    pub providers: Vec<String>,
    pub output_extension: String,
    pub timeout_secs: u64,
    pub credentials_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            storage: config.storage.clone(),
            acquisition: SanitizedAcquisitionConfig {
                tool_path: config.acquisition.tool_path.clone(),
                providers: config.acquisition.providers.clone(),
                output_extension: config.acquisition.output_extension.clone(),
                timeout_secs: config.acquisition.timeout_secs,
                credentials_configured: config
                    .acquisition
                    .credentials
                    .as_ref()
                    .is_some_and(Credentials::is_complete),
            },
            retention: config.retention.clone(),
            publisher: config.publisher.clone(),
        }
    }
}
