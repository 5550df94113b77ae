pub mod acquisition;
pub mod config;
pub mod job;
pub mod metrics;
pub mod orchestrator;
pub mod packager;
pub mod provider;
pub mod publisher;
pub mod reaper;
pub mod source;
pub mod testing;

pub use acquisition::{Acquirer, AcquisitionError, SpotdlAcquirer};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, SanitizedConfig,
};
pub use job::{
    InMemoryJobStore, JobRecord, JobStatus, JobStore, JobStoreError, ProgressEntry,
    ProgressPhase,
};
pub use orchestrator::{JobOrchestrator, OrchestratorConfig, OrchestratorError, Submission};
pub use packager::{Packager, PackagerError, ZipPackager};
pub use provider::ProviderList;
pub use publisher::{ProgressPublisher, PublisherMessage, TerminalSummary};
pub use reaper::{ArtifactCleaner, Reaper, SweepReport};
pub use source::{normalize_source_url, SourceError};
