//! Batched classification across independent issues.
//!
//! There is no cross-issue ordering requirement, so a sweep fans out
//! over a bounded number of workers. Classification is blocking (the
//! live backend shells out), so each issue runs on the blocking pool.
//! Duplicate-detection quality depends on the completeness of the
//! open-issue snapshot the caller passes in.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::{ClassifyError, IssueClassifier, TriageResult};
use crate::sources::traits::Issue;

/// Classify `issues` against a shared open-issue snapshot, at most
/// `max_concurrent` at a time. Returns one entry per input issue, in
/// input order; per-issue failures do not abort the sweep.
pub async fn classify_batched(
    classifier: Arc<IssueClassifier>,
    issues: Vec<Issue>,
    known_open_issues: Arc<Vec<Issue>>,
    max_concurrent: usize,
) -> Vec<(u64, Result<TriageResult, ClassifyError>)> {
    if issues.is_empty() {
        return vec![];
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

    log::info!(
        "classifying {} issue(s) with max_concurrent={}",
        issues.len(),
        max_concurrent
    );

    let numbers: Vec<u64> = issues.iter().map(|issue| issue.number).collect();
    let tasks: Vec<_> = issues
        .into_iter()
        .map(|issue| {
            let sem = Arc::clone(&semaphore);
            let classifier = Arc::clone(&classifier);
            let pool = Arc::clone(&known_open_issues);
            tokio::spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore closed unexpectedly");
                let number = issue.number;
                let result = tokio::task::spawn_blocking(move || {
                    classifier.classify(&issue, &pool)
                })
                .await
                .unwrap_or_else(|e| Err(ClassifyError::Task(e.to_string())));
                (number, result)
            })
        })
        .collect();

    numbers
        .into_iter()
        .zip(join_all(tasks).await)
        .map(|(number, joined)| match joined {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("classification task join error: {e}");
                (number, Err(ClassifyError::Task(e.to_string())))
            }
        })
        .collect()
}
