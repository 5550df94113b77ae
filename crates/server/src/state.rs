use std::sync::Arc;

use musify_core::{
    Acquirer, Config, InMemoryJobStore, JobOrchestrator, JobStore, OrchestratorConfig, Packager,
    ProgressPublisher, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: JobOrchestrator,
    publisher: ProgressPublisher,
}

impl AppState {
    pub fn new(config: Config, orchestrator: JobOrchestrator, publisher: ProgressPublisher) -> Self {
        Self {
            config,
            orchestrator,
            publisher,
        }
    }

    /// Wire an in-memory job store between a new orchestrator and publisher.
    pub fn with_components(
        config: Config,
        acquirer: Arc<dyn Acquirer>,
        packager: Arc<dyn Packager>,
    ) -> Self {
        let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        let orchestrator = JobOrchestrator::new(
            OrchestratorConfig::from_config(&config),
            Arc::clone(&store),
            acquirer,
            packager,
        );
        let publisher = ProgressPublisher::new(store, &config.publisher);
        Self::new(config, orchestrator, publisher)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &JobOrchestrator {
        &self.orchestrator
    }

    pub fn publisher(&self) -> &ProgressPublisher {
        &self.publisher
    }
}
