//! ZIP packager implementation.

use async_trait::async_trait;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::PackagerError;
use super::traits::Packager;

/// Writes deflated ZIP archives.
#[derive(Debug, Clone, Default)]
pub struct ZipPackager;

impl ZipPackager {
    pub fn new() -> Self {
        Self
    }

    /// Blocking archive writer. Returns the number of entries written.
    fn write_archive(files: &[PathBuf], archive_path: &Path) -> Result<usize, PackagerError> {
        let output = File::create(archive_path)?;
        let mut writer = ZipWriter::new(output);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut written = 0;
        for path in files {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            let mut input = match File::open(path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("Skipping vanished file {}", path.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            writer
                .start_file(name.as_str(), options)
                .map_err(|e| PackagerError::write_failed(archive_path, e))?;
            io::copy(&mut input, &mut writer)?;
            debug!("Added {} to {}", name, archive_path.display());
            written += 1;
        }

        writer
            .finish()
            .map_err(|e| PackagerError::write_failed(archive_path, e))?;

        if written == 0 {
            return Err(PackagerError::Empty);
        }
        Ok(written)
    }
}

#[async_trait]
impl Packager for ZipPackager {
    fn name(&self) -> &str {
        "zip"
    }

    async fn package(
        &self,
        files: &[PathBuf],
        archive_path: &Path,
    ) -> Result<PathBuf, PackagerError> {
        if files.is_empty() {
            return Err(PackagerError::Empty);
        }

        if let Some(parent) = archive_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let files = files.to_vec();
        let target = archive_path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || Self::write_archive(&files, &target))
            .await
            .map_err(|e| PackagerError::TaskFailed(e.to_string()))
            .and_then(|r| r);

        match result {
            Ok(count) => {
                info!("Packaged {} file(s) into {}", count, archive_path.display());
                Ok(archive_path.to_path_buf())
            }
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(archive_path).await {
                    if remove_err.kind() != io::ErrorKind::NotFound {
                        warn!(
                            "Failed to remove partial archive {}: {}",
                            archive_path.display(),
                            remove_err
                        );
                    }
                }
                Err(e)
            }
        }
    }
}
