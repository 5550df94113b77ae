//! Job records and their store.
//!
//! The store is the only state shared between the orchestrator's driving
//! tasks, progress subscribers and the reaper.

mod memory;
mod store;
mod types;

pub use memory::InMemoryJobStore;
pub use store::{JobStore, JobStoreError};
pub use types::{
    new_job_id, JobRecord, JobStatus, ProgressEntry, ProgressPhase, ProgressSlice, Terminal,
};
