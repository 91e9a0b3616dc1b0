use serde::{Deserialize, Serialize};

/// A tracker issue as seen by the triage engine.
///
/// Immutable for the duration of one classification call; the engine
/// only ever reads it and returns a result for the caller to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Issue number, unique within the tracker.
    pub number: u64,
    pub title: String,
    /// May be empty; an empty body is not an error.
    #[serde(default)]
    pub body: String,
    pub author: String,
    pub created_at: String,
    /// Labels currently on the issue, used by the processing gate.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Abstraction over issue-tracker operations so the `gh` CLI can be
/// swapped for direct API calls later. The classification engine never
/// calls these; callers translate a triage result into these operations.
pub trait IssueTracker {
    type Error: std::error::Error;

    /// Returns `true` when the tracker is installed and authenticated.
    fn is_available(&self) -> bool;

    /// Fetch a single issue by number.
    fn get_issue(&self, number: u64) -> Result<Issue, Self::Error>;

    /// Snapshot of open issues used for duplicate detection.
    fn list_open_issues(&self, limit: usize) -> Result<Vec<Issue>, Self::Error>;

    /// Add labels to an issue.
    fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), Self::Error>;

    /// Remove labels from an issue.
    fn remove_labels(&self, number: u64, labels: &[String]) -> Result<(), Self::Error>;

    /// Add assignees to an issue.
    fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<(), Self::Error>;

    /// Post a comment on an issue.
    fn post_comment(&self, number: u64, body: &str) -> Result<(), Self::Error>;

    /// Close an issue (used for confirmed duplicates).
    fn close_issue(&self, number: u64) -> Result<(), Self::Error>;
}
