use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use musify_core::{
    load_config, load_config_from_env, validate_config, Config, ConfigError, Reaper,
    SanitizedConfig, SpotdlAcquirer, ZipPackager,
};
use musify_core::config::LogFormat;

use musify_server::api::create_router;
use musify_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

/// Load the config file, falling back to defaults plus environment when the
/// file does not exist.
fn load(config_path: &Path) -> Result<(Config, bool)> {
    match load_config(config_path) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::FileNotFound(_)) => {
            let config = load_config_from_env().context("Failed to load config from environment")?;
            Ok((config, false))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load config from {:?}", config_path)),
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into());
    match format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn run() -> Result<()> {
    // Determine config path
    let config_path = std::env::var("MUSIFY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration before logging so the format setting applies
    let (config, from_file) = load(&config_path)?;
    init_logging(config.logging.format);

    if from_file {
        info!("Loaded configuration from {:?}", config_path);
    } else {
        warn!("No config file at {:?}, using defaults and environment", config_path);
    }

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!("Musify {} starting (config {})", VERSION, &config_hash[..16]);
    info!("Providers: {}", config.acquisition.providers.join(", "));
    info!("Downloads dir: {:?}", config.storage.downloads_dir);
    info!("Archives dir: {:?}", config.storage.archives_dir);

    for dir in [&config.storage.downloads_dir, &config.storage.archives_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {:?}", dir))?;
    }

    // Build the engine
    let acquirer = Arc::new(SpotdlAcquirer::new(config.acquisition.clone()));
    let packager = Arc::new(ZipPackager::new());
    let state = Arc::new(AppState::with_components(config.clone(), acquirer, packager));

    // Start the reaper
    let reaper = Reaper::new(
        Arc::clone(state.orchestrator().store()),
        state.orchestrator().cleaner().clone(),
        config.retention.clone(),
    );
    reaper.start().await;

    // Create router
    let app = create_router(Arc::clone(&state));

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error");

    info!("Stopping reaper...");
    reaper.stop().await;
    info!("Server shut down");

    served
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
