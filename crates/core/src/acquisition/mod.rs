//! Acquisition runner: one external tool invocation per provider attempt.
//!
//! The file-count delta in the job's working directory is the only success
//! signal. The tool's exit code is logged but never trusted, since the tool
//! may exit non-zero after producing usable files or exit zero with nothing.

mod error;
mod files;
mod spotdl;
mod traits;

pub use error::AcquisitionError;
pub use files::{count_output_files, has_extension, list_output_files};
pub use spotdl::SpotdlAcquirer;
pub use traits::Acquirer;
