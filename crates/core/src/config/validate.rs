use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one acquisition provider is configured
/// - Output extension is a bare extension
/// - Reaper sweeps more often than the retention window expires
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.acquisition.providers.iter().all(|p| p.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "acquisition.providers must name at least one provider".to_string(),
        ));
    }

    let ext = &config.acquisition.output_extension;
    if ext.is_empty() || ext.contains('.') || ext.contains('/') {
        return Err(ConfigError::ValidationError(format!(
            "acquisition.output_extension must be a bare extension, got {:?}",
            ext
        )));
    }

    if config.acquisition.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "acquisition.timeout_secs cannot be 0".to_string(),
        ));
    }

    let retention = &config.retention;
    if retention.sweep_interval_secs == 0 || retention.sweep_interval_secs >= retention.window_secs
    {
        return Err(ConfigError::ValidationError(format!(
            "retention.sweep_interval_secs ({}) must be non-zero and shorter than retention.window_secs ({})",
            retention.sweep_interval_secs, retention.window_secs
        )));
    }

    if config.publisher.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "publisher.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}
