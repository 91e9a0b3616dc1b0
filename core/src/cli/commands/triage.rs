use colored::Colorize;

use crate::classify::{self, ClassifyError, IssueClassifier};
use crate::cli::OutputFormat;
use crate::config::TriageOptions;
use crate::error::AppError;
use crate::sources::github::GhCliTracker;
use crate::sources::traits::IssueTracker;

/// Triage one issue: fetch, classify against a snapshot of open issues,
/// and apply the result unless `--dry-run` was given.
pub fn run(
    repo: Option<String>,
    config_path: Option<&str>,
    options: &TriageOptions,
    number: u64,
    snapshot: usize,
    dry_run: bool,
    format: OutputFormat,
) -> Result<(), String> {
    let config = super::load_config(config_path)?;
    super::ensure_model_available(options)?;
    let tracker = GhCliTracker::new(repo);
    if !tracker.is_available() {
        return Err("gh CLI is not installed or not authenticated".to_owned());
    }

    let issue = tracker
        .get_issue(number)
        .map_err(|e| format!("failed to fetch issue #{number}: {}", AppError::from(e)))?;

    if !classify::should_process(&issue.labels) {
        println!(
            "{} issue #{number} is already classified or in progress",
            "Skipped".yellow().bold()
        );
        return Ok(());
    }

    let open_issues = tracker
        .list_open_issues(snapshot)
        .map_err(|e| format!("failed to list open issues: {}", AppError::from(e)))?;

    let classifier = IssueClassifier::new(config, options);
    let result = match classifier.classify(&issue, &open_issues) {
        Ok(result) => result,
        Err(err) => {
            if matches!(err, ClassifyError::Backend(_)) {
                // The issue still needs eyes even when the backend is down.
                super::flag_for_review(&tracker, number);
            }
            return Err(format!(
                "classification failed for #{number}: {}",
                AppError::from(err)
            ));
        }
    };

    match format {
        OutputFormat::Json => super::print_json(&result)?,
        OutputFormat::Text => super::print_result(number, &result),
    }

    if dry_run {
        println!("{} no changes applied", "Dry run:".yellow().bold());
        return Ok(());
    }

    super::apply_result(&tracker, number, &issue.labels, &result)
}
