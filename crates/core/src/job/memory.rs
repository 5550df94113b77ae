//! In-memory job store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::store::{JobStore, JobStoreError};
use super::types::{JobRecord, ProgressEntry, ProgressSlice, Terminal};

type SharedRecord = Arc<Mutex<JobRecord>>;

/// Memory-resident job store.
///
/// The map lock is held only long enough to look up, insert or remove an
/// entry. Every mutation happens under the record's own mutex, so work on one
/// job never waits on another.
#[derive(Default)]
pub struct InMemoryJobStore {
    records: RwLock<HashMap<String, SharedRecord>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, id: &str) -> Option<SharedRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    fn lock(record: &SharedRecord) -> MutexGuard<'_, JobRecord> {
        record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` to a live record. Returns false if the record is absent.
    fn update(&self, id: &str, f: impl FnOnce(&mut JobRecord) -> bool) -> bool {
        let Some(record) = self.record(id) else {
            return false;
        };
        let mut guard = Self::lock(&record);
        f(&mut guard)
    }
}

impl JobStore for InMemoryJobStore {
    fn create_at(
        &self,
        id: &str,
        source_url: &str,
        created_at: DateTime<Utc>,
    ) -> Result<JobRecord, JobStoreError> {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(id) {
            return Err(JobStoreError::DuplicateJob(id.to_string()));
        }

        let record = JobRecord::new(id, source_url, created_at);
        records.insert(id.to_string(), Arc::new(Mutex::new(record.clone())));
        Ok(record)
    }

    fn get(&self, id: &str) -> Result<JobRecord, JobStoreError> {
        let record = self
            .record(id)
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        let snapshot = Self::lock(&record).clone();
        Ok(snapshot)
    }

    fn progress_since(&self, id: &str, cursor: usize) -> Result<ProgressSlice, JobStoreError> {
        let record = self
            .record(id)
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        let record = Self::lock(&record);

        let start = cursor.min(record.progress_log.len());
        Ok(ProgressSlice {
            entries: record.progress_log[start..].to_vec(),
            next_cursor: record.progress_log.len(),
            status: record.status,
            song_count: record.song_count,
            error: record.error.clone(),
        })
    }

    fn mark_running(&self, id: &str) -> bool {
        self.update(id, JobRecord::mark_running)
    }

    fn append_progress(&self, id: &str, entry: ProgressEntry) -> bool {
        self.update(id, |record| {
            record.progress_log.push(entry);
            true
        })
    }

    fn record_provider(&self, id: &str, provider: &str) -> bool {
        self.update(id, |record| {
            record.providers_tried.push(provider.to_string());
            true
        })
    }

    fn set_terminal(&self, id: &str, terminal: Terminal) -> bool {
        self.update(id, |record| record.finish(terminal))
    }

    fn delete(&self, id: &str) -> Result<JobRecord, JobStoreError> {
        let removed = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        let record = Self::lock(&removed).clone();
        Ok(record)
    }

    fn list_ids_older_than(&self, age: Duration) -> Vec<String> {
        let cutoff = match chrono::Duration::from_std(age) {
            Ok(age) => Utc::now() - age,
            // An age too large for chrono can never be exceeded.
            Err(_) => return Vec::new(),
        };

        let records: Vec<(String, SharedRecord)> = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, record)| (id.clone(), Arc::clone(record)))
            .collect();

        records
            .into_iter()
            .filter(|(_, record)| Self::lock(record).created_before(cutoff))
            .map(|(id, _)| id)
            .collect()
    }

    fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobStatus, ProgressPhase};
    use std::path::PathBuf;
    use std::thread;

    const URL: &str = "https://open.spotify.com/playlist/abc123";

    #[test]
    fn test_create_and_get() {
        let store = InMemoryJobStore::new();
        let created = store.create("job-1", URL).unwrap();
        assert_eq!(created.status, JobStatus::Pending);

        let fetched = store.get("job-1").unwrap();
        assert_eq!(fetched.id, "job-1");
        assert_eq!(fetched.source_url, URL);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_create_duplicate_fails() {
        let store = InMemoryJobStore::new();
        store.create("job-1", URL).unwrap();
        let result = store.create("job-1", URL);
        assert_eq!(result.unwrap_err(), JobStoreError::DuplicateJob("job-1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = InMemoryJobStore::new();
        assert_eq!(
            store.get("missing").unwrap_err(),
            JobStoreError::NotFound("missing".to_string())
        );
    }

    #[test]
    fn test_mutations_on_missing_record_are_noops() {
        let store = InMemoryJobStore::new();
        assert!(!store.mark_running("missing"));
        assert!(!store.append_progress("missing", ProgressEntry::starting()));
        assert!(!store.record_provider("missing", "youtube"));
        assert!(!store.set_terminal("missing", Terminal::failed("boom")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_terminal_is_idempotent() {
        let store = InMemoryJobStore::new();
        store.create("job-1", URL).unwrap();
        store.mark_running("job-1");

        assert!(store.set_terminal(
            "job-1",
            Terminal::Completed {
                song_count: 2,
                archive_path: PathBuf::from("zips/job-1.zip"),
            }
        ));
        assert!(!store.set_terminal("job-1", Terminal::failed("second")));

        let record = store.get("job-1").unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.song_count, 2);
        assert!(record.error.is_none());
    }

    #[test]
    fn test_progress_since_cursor() {
        let store = InMemoryJobStore::new();
        store.create("job-1", URL).unwrap();
        store.append_progress("job-1", ProgressEntry::starting());
        store.append_progress("job-1", ProgressEntry::trying("youtube"));

        let first = store.progress_since("job-1", 0).unwrap();
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.next_cursor, 2);

        store.append_progress("job-1", ProgressEntry::completed("Song"));
        let second = store.progress_since("job-1", first.next_cursor).unwrap();
        assert_eq!(second.entries.len(), 1);
        assert_eq!(second.entries[0].phase, ProgressPhase::Completed);
        assert_eq!(second.next_cursor, 3);

        // A cursor past the end yields nothing rather than panicking
        let past = store.progress_since("job-1", 10).unwrap();
        assert!(past.entries.is_empty());
    }

    #[test]
    fn test_progress_log_is_prefix_stable() {
        let store = InMemoryJobStore::new();
        store.create("job-1", URL).unwrap();
        store.append_progress("job-1", ProgressEntry::starting());
        let before = store.get("job-1").unwrap().progress_log;

        store.append_progress("job-1", ProgressEntry::trying("youtube"));
        let after = store.get("job-1").unwrap().progress_log;

        assert_eq!(&after[..before.len()], &before[..]);
    }

    #[test]
    fn test_delete_then_delete_again() {
        let store = InMemoryJobStore::new();
        store.create("job-1", URL).unwrap();
        assert!(store.delete("job-1").is_ok());
        assert_eq!(
            store.delete("job-1").unwrap_err(),
            JobStoreError::NotFound("job-1".to_string())
        );
    }

    #[test]
    fn test_list_ids_older_than() {
        let store = InMemoryJobStore::new();
        store
            .create_at("old", URL, Utc::now() - chrono::Duration::minutes(45))
            .unwrap();
        store.create("fresh", URL).unwrap();

        let old = store.list_ids_older_than(Duration::from_secs(30 * 60));
        assert_eq!(old, vec!["old".to_string()]);
    }

    #[test]
    fn test_list_ids_with_huge_age_is_empty() {
        let store = InMemoryJobStore::new();
        store.create("job-1", URL).unwrap();
        assert!(store.list_ids_older_than(Duration::MAX).is_empty());
    }

    #[test]
    fn test_concurrent_appends_stay_isolated() {
        let store = Arc::new(InMemoryJobStore::new());
        store.create("a", URL).unwrap();
        store.create("b", URL).unwrap();

        let handles: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|id| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..200 {
                        store.append_progress(id, ProgressEntry::new(id, ProgressPhase::Trying, i.to_string()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for id in ["a", "b"] {
            let log = store.get(id).unwrap().progress_log;
            assert_eq!(log.len(), 200);
            assert!(log.iter().all(|e| e.label == id));
            // Appends from a single writer keep their order
            for (i, entry) in log.iter().enumerate() {
                assert_eq!(entry.detail, i.to_string());
            }
        }
    }
}
