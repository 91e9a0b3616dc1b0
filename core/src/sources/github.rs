//! GitHub issue-tracker implementation backed by the `gh` CLI.

use serde::{Deserialize, Serialize};
use std::process::Command;
use thiserror::Error;

use super::traits::{Issue, IssueTracker};

const ISSUE_JSON_FIELDS: &str = "number,title,body,author,createdAt,labels";

#[derive(Error, Debug)]
pub enum GhError {
    #[error("gh I/O error: {0}")]
    Io(String),
    #[error("gh command error: {0}")]
    Command(String),
    #[error("gh parse error: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Wire types (gh JSON shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GhAuthor {
    login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GhLabel {
    name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    author: GhAuthor,
    created_at: String,
    #[serde(default)]
    labels: Vec<GhLabel>,
}

impl From<GhIssue> for Issue {
    fn from(raw: GhIssue) -> Self {
        Issue {
            number: raw.number,
            title: raw.title,
            body: raw.body.unwrap_or_default(),
            author: raw.author.login,
            created_at: raw.created_at,
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// GhCliTracker
// ---------------------------------------------------------------------------

/// [`IssueTracker`] backed by the `gh` CLI, optionally pinned to a
/// specific `owner/name` repository.
pub struct GhCliTracker {
    repo: Option<String>,
}

impl GhCliTracker {
    pub fn new(repo: Option<String>) -> Self {
        Self { repo }
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, GhError> {
        let mut cmd = Command::new("gh");
        cmd.args(args);
        if let Some(repo) = &self.repo {
            cmd.args(["--repo", repo]);
        }

        let output = cmd.output().map_err(|e| GhError::Io(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GhError::Command(stderr.into_owned()));
        }
        Ok(output.stdout)
    }
}

impl IssueTracker for GhCliTracker {
    type Error = GhError;

    fn is_available(&self) -> bool {
        Command::new("gh")
            .args(["auth", "status"])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn get_issue(&self, number: u64) -> Result<Issue, GhError> {
        let stdout = self.run(&[
            "issue",
            "view",
            &number.to_string(),
            "--json",
            ISSUE_JSON_FIELDS,
        ])?;
        let raw: GhIssue =
            serde_json::from_slice(&stdout).map_err(|e| GhError::Parse(e.to_string()))?;
        Ok(raw.into())
    }

    fn list_open_issues(&self, limit: usize) -> Result<Vec<Issue>, GhError> {
        let stdout = self.run(&[
            "issue",
            "list",
            "--state",
            "open",
            "--limit",
            &limit.to_string(),
            "--json",
            ISSUE_JSON_FIELDS,
        ])?;
        let raw: Vec<GhIssue> =
            serde_json::from_slice(&stdout).map_err(|e| GhError::Parse(e.to_string()))?;
        Ok(raw.into_iter().map(Issue::from).collect())
    }

    fn add_labels(&self, number: u64, labels: &[String]) -> Result<(), GhError> {
        if labels.is_empty() {
            return Ok(());
        }
        let mut args = vec!["issue".to_owned(), "edit".to_owned(), number.to_string()];
        for label in labels {
            args.push("--add-label".to_owned());
            args.push(label.clone());
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&arg_refs).map(|_| ())
    }

    fn remove_labels(&self, number: u64, labels: &[String]) -> Result<(), GhError> {
        if labels.is_empty() {
            return Ok(());
        }
        let mut args = vec!["issue".to_owned(), "edit".to_owned(), number.to_string()];
        for label in labels {
            args.push("--remove-label".to_owned());
            args.push(label.clone());
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&arg_refs).map(|_| ())
    }

    fn add_assignees(&self, number: u64, assignees: &[String]) -> Result<(), GhError> {
        if assignees.is_empty() {
            return Ok(());
        }
        let mut args = vec!["issue".to_owned(), "edit".to_owned(), number.to_string()];
        for assignee in assignees {
            args.push("--add-assignee".to_owned());
            args.push(assignee.clone());
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run(&arg_refs).map(|_| ())
    }

    fn post_comment(&self, number: u64, body: &str) -> Result<(), GhError> {
        self.run(&["issue", "comment", &number.to_string(), "--body", body])
            .map(|_| ())
    }

    fn close_issue(&self, number: u64) -> Result<(), GhError> {
        self.run(&["issue", "close", &number.to_string()]).map(|_| ())
    }
}
