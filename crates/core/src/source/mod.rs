//! Source URL validation and normalization.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use thiserror::Error;

/// Accepted playlist, album and track links.
static SOURCE_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://open\.spotify\.com/(playlist|album|track)/[a-zA-Z0-9]+(\?.*)?$")
        .expect("source URL pattern is valid")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("invalid source URL")]
    Invalid,
}

/// Whether a URL is acceptable for submission.
pub fn is_valid_source_url(url: &str) -> bool {
    SOURCE_URL_PATTERN.is_match(url)
}

/// Validate a URL and strip its query string.
pub fn normalize_source_url(url: &str) -> Result<String, SourceError> {
    if !is_valid_source_url(url) {
        return Err(SourceError::Invalid);
    }
    Ok(url.split('?').next().unwrap_or(url).to_string())
}
