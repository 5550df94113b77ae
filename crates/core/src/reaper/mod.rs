//! Time-based eviction of jobs and their artifacts.

mod cleaner;
mod runner;

pub use cleaner::{ArtifactCleaner, CleanupError};
pub use runner::{Reaper, SweepReport};
