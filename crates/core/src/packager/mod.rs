//! Archive packaging for finished jobs.

mod error;
mod traits;
mod zip_archive;

pub use error::PackagerError;
pub use traits::Packager;
pub use zip_archive::ZipPackager;
