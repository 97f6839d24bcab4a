//! Memoized snapshot store around the ingestion pipeline.
//!
//! Ingestion is expected to run once per process lifetime (or once per
//! explicit refresh): the first [`SnapshotStore::get`] builds the dataset,
//! later calls return the same `Arc` without re-reading any files. This
//! memoization is the only caching contract in the system — the key space
//! is the fixed configured source set, so there is no eviction policy and
//! no TTL. A missing source is a configuration problem reported once
//! inside the dataset, never retried here.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use insight_data::analysis::{build_dataset, Dataset};
use insight_data::sources::SourceRegistry;

/// Process-wide holder of the immutable [`Dataset`] snapshot.
///
/// Concurrent interactive consumers each derive their own filtered views
/// from the shared snapshot; nothing here mutates in place. Refresh builds
/// a new dataset and atomically swaps the `Arc`.
pub struct SnapshotStore {
    data_dir: PathBuf,
    registry: SourceRegistry,
    snapshot: RwLock<Option<Arc<Dataset>>>,
}

impl SnapshotStore {
    pub fn new(data_dir: PathBuf, registry: SourceRegistry) -> Self {
        Self {
            data_dir,
            registry,
            snapshot: RwLock::new(None),
        }
    }

    /// Return the current snapshot, building it on first use.
    ///
    /// Repeated calls return the identical `Arc` until [`refresh`] or
    /// [`invalidate`] is called.
    ///
    /// [`refresh`]: SnapshotStore::refresh
    /// [`invalidate`]: SnapshotStore::invalidate
    pub fn get(&self) -> Arc<Dataset> {
        if let Some(snapshot) = self.snapshot.read().expect("snapshot lock").as_ref() {
            tracing::debug!("returning memoized dataset snapshot");
            return Arc::clone(snapshot);
        }
        self.refresh()
    }

    /// Rebuild the dataset and atomically replace the snapshot.
    pub fn refresh(&self) -> Arc<Dataset> {
        let dataset = Arc::new(build_dataset(&self.data_dir, &self.registry));
        tracing::debug!(
            sessions = dataset.sessions.len(),
            joined_rows = dataset.joined.len(),
            failures = dataset.source_failures.len(),
            "dataset snapshot replaced"
        );
        *self.snapshot.write().expect("snapshot lock") = Some(Arc::clone(&dataset));
        dataset
    }

    /// Drop the snapshot, forcing the next [`SnapshotStore::get`] to rebuild.
    pub fn invalidate(&self) {
        *self.snapshot.write().expect("snapshot lock") = None;
        tracing::debug!("dataset snapshot invalidated");
    }

    /// `true` when a snapshot is currently held.
    pub fn is_loaded(&self) -> bool {
        self.snapshot.read().expect("snapshot lock").is_some()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::models::Flavor;
    use insight_data::sources::BatchSource;
    use tempfile::TempDir;

    fn write_batch(dir: &std::path::Path, name: &str) {
        let doc = serde_json::json!({
            "responseData": [{
                "sessions": [{
                    "sessionId": "S1",
                    "date": "15/01/2025",
                    "trainingCourseCode": "A320-TR",
                    "componentName": "LOFT 1",
                    "startTime": "08:00",
                    "endTime": "12:00",
                    "instructors": [
                        {"name": "Alice", "staffNumber": "1001", "dutyCode": "TRI"}
                    ],
                    "trainee": [
                        {"name": "Bob", "staffNumber": "2002", "dutyCode": "FO"}
                    ]
                }]
            }]
        });
        std::fs::write(dir.join(name), serde_json::to_string(&doc).unwrap()).unwrap();
    }

    fn make_store(dir: &std::path::Path) -> SnapshotStore {
        let registry = SourceRegistry::new(vec![BatchSource::new("a.JSON", Flavor::Simulator)]);
        SnapshotStore::new(dir.to_path_buf(), registry)
    }

    #[test]
    fn test_get_builds_on_first_use() {
        let dir = TempDir::new().unwrap();
        write_batch(dir.path(), "a.JSON");
        let store = make_store(dir.path());

        assert!(!store.is_loaded());
        let dataset = store.get();
        assert!(store.is_loaded());
        assert_eq!(dataset.sessions.len(), 1);
    }

    #[test]
    fn test_get_memoizes_without_rereading_files() {
        let dir = TempDir::new().unwrap();
        write_batch(dir.path(), "a.JSON");
        let store = make_store(dir.path());

        let first = store.get();

        // Delete the batch file: a re-read would now fail closed, so an
        // unchanged result proves the snapshot was served from memory.
        std::fs::remove_file(dir.path().join("a.JSON")).unwrap();
        let second = store.get();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(second.source_failures.is_empty());
    }

    #[test]
    fn test_refresh_replaces_snapshot() {
        let dir = TempDir::new().unwrap();
        write_batch(dir.path(), "a.JSON");
        let store = make_store(dir.path());

        let first = store.get();
        std::fs::remove_file(dir.path().join("a.JSON")).unwrap();

        let second = store.refresh();

        // New snapshot, and it saw the changed world (fail-closed).
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.source_failures.len(), 1);
        // Old snapshot is untouched: readers holding it are unaffected.
        assert!(first.source_failures.is_empty());
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let dir = TempDir::new().unwrap();
        write_batch(dir.path(), "a.JSON");
        let store = make_store(dir.path());

        let first = store.get();
        store.invalidate();
        assert!(!store.is_loaded());

        let second = store.get();
        assert!(!Arc::ptr_eq(&first, &second));
    }
}
