//! Ordered acquisition provider strategies.

use std::collections::HashSet;

/// Fixed, ordered list of acquisition providers.
///
/// Order is the preference ranking; the list never reorders itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderList {
    providers: Vec<String>,
}

impl ProviderList {
    /// Build a list from configured names. Blank names are skipped and
    /// repeated names keep their first position.
    pub fn new<I, S>(providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let providers = providers
            .into_iter()
            .map(|p| p.into().trim().to_string())
            .filter(|p| !p.is_empty() && seen.insert(p.clone()))
            .collect();
        Self { providers }
    }

    /// First provider in preference order that has not been attempted yet.
    pub fn next(&self, attempted: &HashSet<String>) -> Option<&str> {
        self.providers
            .iter()
            .find(|p| !attempted.contains(p.as_str()))
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
