pub mod classify;
pub mod sweep;
pub mod triage;

use std::fmt::Display;

use colored::Colorize;

use crate::classify::{Outcome, TriageResult};
use crate::config::{BackendKind, EnrichmentMode, TriageConfig, TriageOptions};
use crate::error::AppError;
use crate::sources::traits::IssueTracker;

/// Results at or below this confidence are routed to a human instead of
/// being applied automatically.
pub const APPLY_CONFIDENCE_THRESHOLD: f64 = 0.7;

pub const MANUAL_REVIEW_LABEL: &str = "needs-human-review";

pub fn load_config(path: Option<&str>) -> Result<TriageConfig, String> {
    let loaded = match path {
        Some(p) => TriageConfig::from_path(std::path::Path::new(p)),
        None => TriageConfig::bundled(),
    };
    loaded.map_err(|e| AppError::from(e).into())
}

/// Fail fast when the selected options need the model CLI and it is
/// not installed, instead of failing halfway through a sweep.
pub fn ensure_model_available(options: &TriageOptions) -> Result<(), String> {
    let needs_model = options.backend == BackendKind::Live
        || options.enrichment == EnrichmentMode::Enabled;
    if needs_model && !crate::model::check_model_available() {
        return Err(AppError::backend("claude CLI not found in PATH").into());
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("failed to serialize output: {e}"))?;
    println!("{text}");
    Ok(())
}

pub fn print_result(number: u64, result: &TriageResult) {
    println!();
    println!("{} issue #{number}", "Triaged".green().bold());
    match &result.outcome {
        Outcome::Duplicate {
            duplicate_of,
            similar_issues,
        } => {
            match duplicate_of {
                Some(n) => println!("  {} duplicate of #{n}", "Outcome:".bold()),
                None => println!("  {} duplicate", "Outcome:".bold()),
            }
            for similar in similar_issues {
                println!(
                    "  similar: #{} ({:.2}) {}",
                    similar.number, similar.score, similar.title
                );
            }
        }
        Outcome::Classified {
            classification,
            suggested_areas,
            missing_info,
        } => {
            println!("  {} {classification}", "Outcome:".bold());
            if let Some(area) = suggested_areas.first() {
                println!("  {} {area}", "Area:".bold());
            }
            if !missing_info.is_empty() {
                println!("  {} {}", "Missing:".bold(), missing_info.join(", "));
            }
        }
    }
    println!("  {} {:.0}%", "Confidence:".bold(), result.confidence * 100.0);
    println!("  {} {}", "Labels:".bold(), result.suggested_labels.join(", "));
    if !result.suggested_assignees.is_empty() {
        println!(
            "  {} {}",
            "Assignees:".bold(),
            result.suggested_assignees.join(", ")
        );
    }
    if result.is_cri {
        println!("  {}", "CRITICAL: flagged as a CRI".red().bold());
    }
    println!("  {} {}", "Reasoning:".bold(), result.reasoning);
}

/// Order-preserving de-duplication of label names.
fn dedup_labels(labels: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    labels
        .iter()
        .filter(|l| seen.insert(l.as_str()))
        .cloned()
        .collect()
}

fn tracker_err(operation: &str, message: String) -> String {
    AppError::tracker(message, operation).into()
}

/// The tracker API wants bare usernames, not @handles.
fn strip_handles(assignees: &[String]) -> Vec<String> {
    assignees
        .iter()
        .map(|a| a.trim_start_matches('@').to_owned())
        .collect()
}

/// Render the comment posted back on the issue.
pub fn build_comment(result: &TriageResult) -> String {
    let mut comment = String::from("**Automated triage analysis**\n\n");
    comment.push_str(&format!(
        "**Classification**: {}\n",
        result.classification()
    ));
    comment.push_str(&format!(
        "**Confidence**: {:.0}%\n",
        result.confidence * 100.0
    ));
    if let Some(area) = result.primary_area() {
        comment.push_str(&format!("**Area**: {area}\n"));
    }
    comment.push('\n');
    comment.push_str(&result.suggested_response);
    if let Outcome::Classified { missing_info, .. } = &result.outcome {
        if !missing_info.is_empty() {
            comment.push_str("\n\n**Please include**: ");
            comment.push_str(&missing_info.join(", "));
        }
    }
    if let Some(wiki) = &result.wiki_response {
        if wiki.found_relevant_docs {
            comment.push_str("\n\n## Relevant documentation\n\n");
            comment.push_str(&wiki.response);
            if wiki.citations_count > 0 {
                comment.push_str(&format!(
                    "\n\n*Found {} relevant documentation page(s).*",
                    wiki.citations_count
                ));
            }
        } else {
            comment.push_str(
                "\n\n*Searched the documentation but found nothing specific to this issue.*",
            );
        }
    }
    comment
}

/// Apply a triage result to a live issue.
///
/// Low-confidence results get the manual-review label instead of the
/// suggested labels and comment. A stale manual-review label from an
/// earlier attempt is cleared once a confident result lands. Assignment
/// failures are reported but do not abort the remaining steps.
pub fn apply_result<T>(
    tracker: &T,
    number: u64,
    existing_labels: &[String],
    result: &TriageResult,
) -> Result<(), String>
where
    T: IssueTracker,
    T::Error: Display,
{
    if result.confidence <= APPLY_CONFIDENCE_THRESHOLD {
        tracker
            .add_labels(number, &[MANUAL_REVIEW_LABEL.to_owned()])
            .map_err(|e| tracker_err("issue edit", format!("failed to label issue #{number}: {e}")))?;
        println!(
            "{} confidence {:.0}% is too low, routed #{number} to manual review",
            "Skipped".yellow().bold(),
            result.confidence * 100.0
        );
        return Ok(());
    }

    let labels = dedup_labels(&result.suggested_labels);
    tracker
        .add_labels(number, &labels)
        .map_err(|e| tracker_err("issue edit", format!("failed to label issue #{number}: {e}")))?;

    tracker
        .post_comment(number, &build_comment(result))
        .map_err(|e| {
            tracker_err(
                "issue comment",
                format!("failed to comment on issue #{number}: {e}"),
            )
        })?;

    if existing_labels.iter().any(|l| l == MANUAL_REVIEW_LABEL) {
        if let Err(e) = tracker.remove_labels(number, &[MANUAL_REVIEW_LABEL.to_owned()]) {
            log::warn!("could not clear stale review label on #{number}: {e}");
        }
    }

    if !result.suggested_assignees.is_empty() {
        let assignees = strip_handles(&result.suggested_assignees);
        if let Err(e) = tracker.add_assignees(number, &assignees) {
            log::warn!("could not assign issue #{number}: {e}");
            println!(
                "{} could not assign {}: {e}",
                "Warning:".yellow().bold(),
                assignees.join(", ")
            );
        }
    }

    if let Outcome::Duplicate {
        duplicate_of: Some(original),
        ..
    } = &result.outcome
    {
        tracker
            .close_issue(number)
            .map_err(|e| tracker_err("issue close", format!("failed to close issue #{number}: {e}")))?;
        println!(
            "{} #{number} as duplicate of #{original}",
            "Closed".green().bold()
        );
    }

    println!("{} result to issue #{number}", "Applied".green().bold());
    Ok(())
}

/// Route an issue whose classification failed to a human.
pub fn flag_for_review<T>(tracker: &T, number: u64)
where
    T: IssueTracker,
    T::Error: Display,
{
    if let Err(e) = tracker.add_labels(number, &[MANUAL_REVIEW_LABEL.to_owned()]) {
        log::warn!("could not flag issue #{number} for review: {e}");
    }
}
