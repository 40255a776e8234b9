// todostore - Durable to-do task engine with JSONL persistence

pub mod error;
pub mod filter;
pub mod jsonl;
pub mod models;
pub mod store;

// Re-export main types for convenience
pub use error::StoreError;
pub use filter::{StatusFilter, TaskQuery};
pub use models::{TaskId, TaskItem, now_ms};
pub use store::TaskStore;
