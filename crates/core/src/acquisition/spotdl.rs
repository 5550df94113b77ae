//! spotdl-based acquirer implementation.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::error::AcquisitionError;
use super::files::count_output_files;
use super::traits::Acquirer;
use crate::config::{AcquisitionConfig, Credentials};

/// Error lines kept per stream for the attempt summary.
const MAX_ERROR_LINES: usize = 20;

/// Runs the spotdl CLI once per provider attempt.
pub struct SpotdlAcquirer {
    config: AcquisitionConfig,
}

impl SpotdlAcquirer {
    pub fn new(config: AcquisitionConfig) -> Self {
        Self { config }
    }

    /// Creates an acquirer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(AcquisitionConfig::default())
    }

    /// Builds spotdl arguments for one attempt.
    fn build_args(
        &self,
        source_url: &str,
        working_dir: &Path,
        provider: &str,
        credentials: Option<&Credentials>,
    ) -> Vec<String> {
        let mut args = vec![
            "download".to_string(),
            source_url.to_string(),
            "--output".to_string(),
            working_dir.to_string_lossy().to_string(),
            "--format".to_string(),
            self.config.output_extension.clone(),
            "--audio".to_string(),
            provider.to_string(),
        ];

        if let Some(creds) = credentials.filter(|c| c.is_complete()) {
            args.extend([
                "--client-id".to_string(),
                creds.client_id.clone(),
                "--client-secret".to_string(),
                creds.client_secret.clone(),
            ]);
        }

        args
    }
}

/// Read a child stream to EOF, logging each line.
///
/// Lines are decoded lossily so stray non UTF-8 bytes never stop the reader
/// before the child closes its end. Returns the lines that look like errors,
/// capped at `MAX_ERROR_LINES`.
async fn drain_lines<R>(stream: Option<R>, stream_name: &str, provider: &str) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut error_lines = Vec::new();
    let Some(stream) = stream else {
        return error_lines;
    };

    let mut lines = BufReader::new(stream).split(b'\n');
    loop {
        match lines.next_segment().await {
            Ok(Some(raw)) => {
                let decoded = String::from_utf8_lossy(&raw);
                let line = decoded.trim();
                if line.is_empty() {
                    continue;
                }
                debug!(provider, stream = stream_name, "[spotdl] {}", line);
                if error_lines.len() < MAX_ERROR_LINES && line.to_lowercase().contains("error") {
                    error_lines.push(line.to_string());
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(provider, stream = stream_name, "Output stream closed: {}", e);
                break;
            }
        }
    }
    error_lines
}

#[async_trait]
impl Acquirer for SpotdlAcquirer {
    fn name(&self) -> &str {
        "spotdl"
    }

    async fn attempt(
        &self,
        source_url: &str,
        working_dir: &Path,
        provider: &str,
        credentials: Option<&Credentials>,
    ) -> Result<usize, AcquisitionError> {
        let start = Instant::now();
        tokio::fs::create_dir_all(working_dir).await?;

        let extension = &self.config.output_extension;
        let before = count_output_files(working_dir, extension).await?;

        if !credentials.is_some_and(Credentials::is_complete) {
            warn!("No client credentials set - provider {} may hit rate limits", provider);
        }

        let args = self.build_args(source_url, working_dir, provider, credentials);
        info!(
            "Running {} for {} with provider {}",
            self.config.tool_path.display(),
            source_url,
            provider
        );

        let mut child = Command::new(&self.config.tool_path)
            .args(&args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AcquisitionError::launch(provider, e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained while the process runs; draining one after
        // the other can deadlock once the second pipe's buffer fills.
        let run = async {
            let (_, stderr_errors) = tokio::join!(
                drain_lines(stdout, "stdout", provider),
                drain_lines(stderr, "stderr", provider),
            );
            let status = child.wait().await;
            (status, stderr_errors)
        };

        let outcome = timeout(self.config.timeout(), run).await;
        match outcome {
            Ok((Ok(status), stderr_errors)) => {
                info!(
                    "spotdl exited with code {:?} for provider {} after {} ms",
                    status.code(),
                    provider,
                    start.elapsed().as_millis()
                );
                if !status.success() && !stderr_errors.is_empty() {
                    warn!(
                        "spotdl reported errors for provider {}: {}",
                        provider,
                        stderr_errors.join(" | ")
                    );
                }
            }
            Ok((Err(e), _)) => {
                warn!("Failed to wait for spotdl (provider {}): {}", provider, e);
            }
            Err(_) => {
                warn!(
                    "spotdl timed out after {} seconds for provider {}, killing it",
                    self.config.timeout_secs, provider
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill spotdl (provider {}): {}", provider, e);
                }
            }
        }

        let after = count_output_files(working_dir, extension).await?;
        let new_files = after.saturating_sub(before);
        info!(
            "Provider {} produced {} new file(s) ({} total)",
            provider, new_files, after
        );
        Ok(new_files)
    }
}
