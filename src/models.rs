// Data model for the task engine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task item.
///
/// Assigned once at creation and never reused, even after the item is
/// deleted. UUIDv7 ids embed the creation timestamp.
pub type TaskId = Uuid;

/// A single to-do entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: TaskId,
    /// Arbitrary text, empty or whitespace-only included. Mutated only
    /// through [`TaskStore::rename`](crate::store::TaskStore::rename).
    pub title: String,
    /// Milliseconds since epoch, fixed at creation.
    pub created_at: i64,
    pub completed: bool,
}

impl TaskItem {
    /// Items are only ever constructed by the store's create operation,
    /// never assembled by callers and inserted later.
    pub(crate) fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            created_at: now_ms(),
            completed: false,
        }
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before Unix epoch")
        .as_millis() as i64
}
