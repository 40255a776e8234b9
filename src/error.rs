// Typed errors for store construction and mutation

use crate::models::TaskId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`TaskStore`](crate::store::TaskStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store directory could not be created or its lock could not be
    /// acquired. Returned from `open` so the host decides what to do
    /// instead of the process aborting.
    #[error("failed to open task store at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The durable task file exists but could not be read at startup.
    #[error("failed to load tasks from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The durable write failed. The in-memory mutation that triggered it
    /// is still applied; the previous durable snapshot is left intact.
    #[error("failed to persist tasks to {}: {source}", path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The operation referenced an id that is not in the store. Never
    /// fatal; the collection is untouched.
    #[error("no task with id {0}")]
    NotFound(TaskId),
}
