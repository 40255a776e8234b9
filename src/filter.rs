// Query filtering for task items

use crate::models::TaskItem;

/// Completion-state predicate for querying tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every item regardless of completion state
    #[default]
    All,
    /// Items with `completed == true`
    Completed,
    /// Items with `completed == false`
    Incomplete,
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Completed => write!(f, "completed"),
            StatusFilter::Incomplete => write!(f, "incomplete"),
        }
    }
}

/// Filter for querying the store
///
/// Combines a completion-state predicate with an optional title search.
/// An empty `search` restricts nothing.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub status: StatusFilter,
    /// Case-insensitive substring matched against item titles.
    pub search: String,
}

impl TaskQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn completed() -> Self {
        Self {
            status: StatusFilter::Completed,
            ..Self::default()
        }
    }

    pub fn incomplete() -> Self {
        Self {
            status: StatusFilter::Incomplete,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    /// Whether `item` passes both the status predicate and the search.
    pub fn matches(&self, item: &TaskItem) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Completed => item.completed,
            StatusFilter::Incomplete => !item.completed,
        };
        if !status_ok {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        item.title
            .to_lowercase()
            .contains(&self.search.to_lowercase())
    }
}
