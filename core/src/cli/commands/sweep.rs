use std::sync::Arc;

use colored::Colorize;

use crate::classify::batch::classify_batched;
use crate::classify::{self, IssueClassifier};
use crate::cli::OutputFormat;
use crate::config::TriageOptions;
use crate::error::AppError;
use crate::sources::github::GhCliTracker;
use crate::sources::traits::IssueTracker;

/// Triage every open issue that has not been classified yet.
///
/// Classification runs concurrently; tracker writes happen one at a
/// time afterwards so a wedged issue cannot corrupt its neighbors.
pub fn run(
    repo: Option<String>,
    config_path: Option<&str>,
    options: &TriageOptions,
    concurrency: usize,
    limit: usize,
    dry_run: bool,
    format: OutputFormat,
) -> Result<(), String> {
    let config = super::load_config(config_path)?;
    super::ensure_model_available(options)?;
    let tracker = GhCliTracker::new(repo);
    if !tracker.is_available() {
        return Err("gh CLI is not installed or not authenticated".to_owned());
    }

    let open_issues = tracker
        .list_open_issues(limit)
        .map_err(|e| format!("failed to list open issues: {}", AppError::from(e)))?;

    let pending: Vec<_> = open_issues
        .iter()
        .filter(|issue| classify::should_process(&issue.labels))
        .cloned()
        .collect();

    if pending.is_empty() {
        println!("{} nothing to triage", "Done:".green().bold());
        return Ok(());
    }
    println!(
        "Triaging {} of {} open issue(s)",
        pending.len(),
        open_issues.len()
    );

    let classifier = Arc::new(IssueClassifier::new(config, options));
    let snapshot = Arc::new(open_issues);

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to start async runtime: {e}"))?;
    let results = runtime.block_on(classify_batched(
        classifier,
        pending,
        Arc::clone(&snapshot),
        concurrency,
    ));

    let mut failures = 0usize;
    for (number, outcome) in &results {
        match outcome {
            Ok(result) => {
                match format {
                    OutputFormat::Json => super::print_json(result)?,
                    OutputFormat::Text => super::print_result(*number, result),
                }
                if !dry_run {
                    let existing = snapshot
                        .iter()
                        .find(|i| i.number == *number)
                        .map(|i| i.labels.as_slice())
                        .unwrap_or_default();
                    if let Err(e) = super::apply_result(&tracker, *number, existing, result) {
                        failures += 1;
                        println!("{} {e}", "Error:".red().bold());
                    }
                }
            }
            Err(err) => {
                failures += 1;
                println!(
                    "{} classification failed for #{number}: {err}",
                    "Error:".red().bold()
                );
                if !dry_run {
                    super::flag_for_review(&tracker, *number);
                }
            }
        }
    }

    if dry_run {
        println!("{} no changes applied", "Dry run:".yellow().bold());
    }
    if failures > 0 {
        return Err(format!("{failures} issue(s) failed during the sweep"));
    }
    println!(
        "{} swept {} issue(s)",
        "Done:".green().bold(),
        results.len()
    );
    Ok(())
}
