//! Output file enumeration.

use std::io;
use std::path::{Path, PathBuf};

/// Whether `path` carries `extension` (case-insensitive, no leading dot).
pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Regular files in `dir` with `extension`, sorted by path.
///
/// A directory that does not exist holds no files.
pub async fn list_output_files(dir: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && has_extension(&path, extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Number of output files in `dir`.
pub async fn count_output_files(dir: &Path, extension: &str) -> io::Result<usize> {
    Ok(list_output_files(dir, extension).await?.len())
}
