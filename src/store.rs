// Task collection engine over a durable JSONL snapshot

use crate::error::StoreError;
use crate::filter::TaskQuery;
use crate::jsonl;
use crate::models::{TaskId, TaskItem};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const TASKS_FILE: &str = "tasks.jsonl";
const LOCK_FILE: &str = ".lock";

/// Authoritative, durable, insertion-ordered collection of task items
///
/// The store is the only writer: items are created, toggled, renamed and
/// deleted exclusively through its operations, and every mutation is
/// followed by a full durable snapshot write. Queries return owned
/// point-in-time snapshots; callers re-query after mutating.
///
/// All operations are synchronous and expect a single logical caller.
/// `&mut self` enforces the single-writer constraint in-process; an
/// exclusive advisory lock on the store directory serializes across
/// processes for the lifetime of the store.
pub struct TaskStore {
    dir: PathBuf,
    tasks_path: PathBuf,
    items: Vec<TaskItem>,
    _lock: File,
}

impl TaskStore {
    /// Open or create a store rooted at the given directory.
    ///
    /// Creates the directory if missing, takes the store lock, and loads
    /// the durable snapshot (empty collection on first run). Any failure
    /// is returned to the host rather than aborting the process.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();

        fs::create_dir_all(&dir).map_err(|e| StoreError::Open {
            path: dir.clone(),
            source: e,
        })?;

        let lock_path = dir.join(LOCK_FILE);
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StoreError::Open {
                path: lock_path.clone(),
                source: e,
            })?;
        lock.try_lock_exclusive().map_err(|e| StoreError::Open {
            path: lock_path.clone(),
            source: e,
        })?;

        let tasks_path = dir.join(TASKS_FILE);
        let items = jsonl::read_items(&tasks_path).map_err(|e| StoreError::Load {
            path: tasks_path.clone(),
            source: e,
        })?;

        debug!(dir = ?dir, count = items.len(), "Opened task store");

        Ok(Self {
            dir,
            tasks_path,
            items,
            _lock: lock,
        })
    }

    /// Get the directory this store is rooted at
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Create a new task and append it to the end of the collection.
    ///
    /// Any title is accepted, empty or whitespace-only included. The new
    /// item starts incomplete with a fresh id and the current timestamp.
    /// On persist failure the item stays in the in-memory collection and
    /// the error is returned.
    pub fn create(&mut self, title: impl Into<String>) -> Result<TaskItem, StoreError> {
        let mut item = TaskItem::new(title);

        // Creation times must be non-decreasing in insertion order even
        // if the wall clock steps backwards.
        if let Some(last) = self.items.last() {
            if item.created_at < last.created_at {
                item.created_at = last.created_at;
            }
        }

        debug!(id = %item.id, title = %item.title, "Creating task");
        self.items.push(item.clone());
        self.persist()?;

        Ok(item)
    }

    /// Flip a task's completed flag in place.
    ///
    /// Toggling twice restores the prior state. Unknown ids leave the
    /// collection untouched and return [`StoreError::NotFound`].
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<TaskItem, StoreError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound(id))?;

        item.completed = !item.completed;
        let snapshot = item.clone();

        debug!(id = %id, completed = snapshot.completed, "Toggled task");
        self.persist()?;

        Ok(snapshot)
    }

    /// Replace a task's title.
    ///
    /// Unknown ids return [`StoreError::NotFound`]. `created_at` and
    /// `completed` are unaffected.
    pub fn rename(&mut self, id: TaskId, title: impl Into<String>) -> Result<TaskItem, StoreError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NotFound(id))?;

        item.title = title.into();
        let snapshot = item.clone();

        debug!(id = %id, title = %snapshot.title, "Renamed task");
        self.persist()?;

        Ok(snapshot)
    }

    /// Permanently remove a task.
    ///
    /// Returns whether anything was removed; deleting an absent id is a
    /// no-op and does not touch durable storage.
    pub fn delete(&mut self, id: TaskId) -> Result<bool, StoreError> {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);

        if self.items.len() == before {
            debug!(id = %id, "Delete of unknown id, nothing to do");
            return Ok(false);
        }

        debug!(id = %id, "Deleted task");
        self.persist()?;

        Ok(true)
    }

    /// Permanently remove every task in `ids`, then persist once.
    ///
    /// A single durable write covers the whole batch. Returns the number
    /// of items removed; absent ids are skipped.
    pub fn delete_many(&mut self, ids: &[TaskId]) -> Result<usize, StoreError> {
        let before = self.items.len();
        self.items.retain(|i| !ids.contains(&i.id));
        let removed = before - self.items.len();

        if removed == 0 {
            return Ok(0);
        }

        debug!(count = removed, "Deleted task batch");
        self.persist()?;

        Ok(removed)
    }

    /// Look up a single task by id, as an owned snapshot.
    pub fn get(&self, id: TaskId) -> Option<TaskItem> {
        self.items.iter().find(|i| i.id == id).cloned()
    }

    /// Query the collection, returning a point-in-time snapshot.
    ///
    /// Insertion order is preserved within the filtered result. The
    /// snapshot does not reflect mutations made after this call.
    pub fn query(&self, query: &TaskQuery) -> Vec<TaskItem> {
        self.items
            .iter()
            .filter(|item| query.matches(item))
            .cloned()
            .collect()
    }

    /// Write the complete current collection durably.
    ///
    /// Atomic from the caller's perspective: either the new snapshot is
    /// fully durable or the previous one is unchanged. Called after every
    /// mutating operation; failures are logged and surfaced while the
    /// in-memory mutation stays applied.
    pub fn persist(&self) -> Result<(), StoreError> {
        jsonl::write_items(&self.tasks_path, &self.items).map_err(|e| {
            warn!(file = ?self.tasks_path, error = ?e, "Failed to persist tasks; keeping in-memory state");
            StoreError::Persist {
                path: self.tasks_path.clone(),
                source: e,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TaskQuery;
    use tempfile::TempDir;
    use uuid::Uuid;

    #[test]
    fn test_open_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("store");

        let store = TaskStore::open(&dir).unwrap();
        assert!(dir.exists());
        assert!(dir.join(".lock").exists());
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_assigns_defaults_and_unique_ids() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        let a = store.create("Buy milk").unwrap();
        let b = store.create("Write report").unwrap();

        assert_eq!(a.title, "Buy milk");
        assert!(!a.completed);
        assert_ne!(a.id, b.id);
        assert!(b.created_at >= a.created_at);

        // Snapshot file exists after the first mutation
        assert!(temp.path().join("tasks.jsonl").exists());
    }

    #[test]
    fn test_create_accepts_empty_title() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        let item = store.create("").unwrap();
        assert_eq!(item.title, "");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_toggle_roundtrip() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        let item = store.create("Buy milk").unwrap();

        let toggled = store.toggle_completed(item.id).unwrap();
        assert!(toggled.completed);

        let back = store.toggle_completed(item.id).unwrap();
        assert!(!back.completed);
        assert_eq!(back.title, item.title);
        assert_eq!(back.created_at, item.created_at);
    }

    #[test]
    fn test_toggle_unknown_id_is_not_found() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();
        store.create("Buy milk").unwrap();

        let missing = Uuid::now_v7();
        let err = store.toggle_completed(missing).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == missing));
        // Collection untouched
        assert!(!store.query(&TaskQuery::all())[0].completed);
    }

    #[test]
    fn test_rename_changes_only_title() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        let item = store.create("Buy milk").unwrap();
        let renamed = store.rename(item.id, "Buy oat milk").unwrap();

        assert_eq!(renamed.id, item.id);
        assert_eq!(renamed.title, "Buy oat milk");
        assert_eq!(renamed.created_at, item.created_at);
        assert!(!renamed.completed);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        let item = store.create("Call mom").unwrap();

        assert!(store.delete(item.id).unwrap());
        assert!(store.query(&TaskQuery::all()).is_empty());

        // Second delete of the same id is a no-op
        assert!(!store.delete(item.id).unwrap());
    }

    #[test]
    fn test_delete_many_removes_batch() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        let a = store.create("a").unwrap();
        let b = store.create("b").unwrap();
        let c = store.create("c").unwrap();

        let removed = store.delete_many(&[a.id, c.id, Uuid::now_v7()]).unwrap();
        assert_eq!(removed, 2);

        let rest = store.query(&TaskQuery::all());
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, b.id);
    }

    #[test]
    fn test_query_partitions_by_status() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        let a = store.create("a").unwrap();
        store.create("b").unwrap();
        store.toggle_completed(a.id).unwrap();

        let all = store.query(&TaskQuery::all());
        let done = store.query(&TaskQuery::completed());
        let open = store.query(&TaskQuery::incomplete());

        assert_eq!(done.len() + open.len(), all.len());
        for item in &done {
            assert!(!open.iter().any(|o| o.id == item.id));
        }
    }

    #[test]
    fn test_query_search_case_insensitive() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        store.create("Buy MILK").unwrap();
        store.create("Write report").unwrap();

        let hits = store.query(&TaskQuery::all().with_search("milk"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Buy MILK");

        // Empty search equals no search
        let no_search = store.query(&TaskQuery::all().with_search(""));
        assert_eq!(no_search.len(), 2);
    }

    #[test]
    fn test_query_preserves_insertion_order() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        let milk = store.create("Buy milk").unwrap();
        store.create("Write report").unwrap();
        store.toggle_completed(milk.id).unwrap();

        let all = store.query(&TaskQuery::all());
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Buy milk");
        assert!(all[0].completed);
        assert_eq!(all[1].title, "Write report");
        assert!(!all[1].completed);

        let open = store.query(&TaskQuery::incomplete());
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].title, "Write report");

        let done = store.query(&TaskQuery::completed());
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].title, "Buy milk");
    }

    #[test]
    fn test_query_is_point_in_time_snapshot() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        store.create("before").unwrap();
        let snapshot = store.query(&TaskQuery::all());
        store.create("after").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.query(&TaskQuery::all()).len(), 2);
    }

    #[test]
    fn test_restart_preserves_items_and_order() {
        let temp = TempDir::new().unwrap();

        let created = {
            let mut store = TaskStore::open(temp.path()).unwrap();
            let a = store.create("one").unwrap();
            store.create("two").unwrap();
            store.create("three").unwrap();
            store.toggle_completed(a.id).unwrap();
            store.query(&TaskQuery::all())
        };

        // Lock released when the first store is dropped
        let reopened = TaskStore::open(temp.path()).unwrap();
        let loaded = reopened.query(&TaskQuery::all());

        assert_eq!(loaded, created);
    }

    #[test]
    fn test_get_returns_snapshot() {
        let temp = TempDir::new().unwrap();
        let mut store = TaskStore::open(temp.path()).unwrap();

        let item = store.create("Buy milk").unwrap();
        assert_eq!(store.get(item.id).unwrap(), item);
        assert!(store.get(Uuid::now_v7()).is_none());
    }

    #[test]
    fn test_persist_failure_keeps_in_memory_mutation() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("store");
        let mut store = TaskStore::open(&dir).unwrap();

        store.create("survives").unwrap();

        // Make the durable write fail by removing the store directory
        fs::remove_dir_all(&dir).unwrap();

        let err = store.create("not durable").unwrap_err();
        assert!(matches!(err, StoreError::Persist { .. }));

        // Both items still visible in the running session
        let all = store.query(&TaskQuery::all());
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].title, "not durable");
    }
}
