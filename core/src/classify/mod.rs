//! Issue classification engine.
//!
//! The [`IssueClassifier`] facade is the single entry point used by
//! every caller: duplicate short-circuit, backend classification,
//! policy derivation, detector augmentation, optional documentation
//! enrichment. It never mutates the issue; callers apply the returned
//! result through the tracker.

pub mod backend;
pub mod batch;
pub mod claude;
pub mod policy;
pub mod prompt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{BackendKind, ConfigError, EnrichmentMode, TriageConfig, TriageOptions};
use crate::detect;
use crate::enrich::{ClaudeDocsAssistant, DocsAssistant, EnrichmentResult};
use crate::similarity::{find_similar, SimilarIssue};
use crate::sources::traits::Issue;

use backend::{BackendError, ClassifyBackend, MockBackend};
use claude::ClaudeBackend;

/// Top similarity score above which an issue is declared a duplicate
/// without consulting the backend.
pub const DUPLICATE_THRESHOLD: f64 = 0.85;

/// Handle that receives security-sensitive issues.
pub const SECURITY_TEAM: &str = "@security-team";

const CRI_NOTICE: &str = "This report matches the criteria for a customer-reported incident \
and has been flagged for immediate escalation.";
const SECURITY_NOTICE: &str = "This issue may be security-sensitive; the security team has \
been added and will review it.";

/// Labels a human applies when classifying an issue manually.
const HUMAN_CLASSIFIED_LABELS: &[&str] = &[
    "bug",
    "feature-request",
    "SR-Support Request",
    "documentation",
    "question",
    "test-issue",
];

/// Labels that mean the issue is already being handled.
const IN_PROGRESS_LABELS: &[&str] = &["Under Investigation", "fixing", "resolution/fix-released"];

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("classification task failed: {0}")]
    Task(String),
}

/// The five mutually exclusive classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Bug,
    Support,
    InfoNeeded,
    Feature,
    Duplicate,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Bug => "BUG",
            Self::Support => "SUPPORT",
            Self::InfoNeeded => "INFO_NEEDED",
            Self::Feature => "FEATURE",
            Self::Duplicate => "DUPLICATE",
        };
        f.write_str(s)
    }
}

/// Classification-specific part of a triage result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Similarity short-circuit or backend-asserted duplicate.
    Duplicate {
        /// The matched issue; `None` when the backend asserted a
        /// duplicate without a similarity match to point at.
        duplicate_of: Option<u64>,
        /// Top matches by score, best first.
        similar_issues: Vec<SimilarIssue>,
    },
    /// A regular classification with routing information.
    Classified {
        classification: Classification,
        /// Inferred area tags; the first entry is the primary area.
        suggested_areas: Vec<String>,
        missing_info: Vec<String>,
    },
}

/// Result of one classification call, created fresh per call and owned
/// by the caller. CRI/security augmentation touches only the common
/// fields, uniformly across both outcome variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageResult {
    /// In `[0, 1]`. For a duplicate short-circuit this is exactly the
    /// top similarity score; otherwise the backend confidence.
    pub confidence: f64,
    pub reasoning: String,
    /// Built incrementally; may contain repeats, consumers de-dupe.
    pub suggested_labels: Vec<String>,
    pub suggested_response: String,
    pub suggested_assignees: Vec<String>,
    pub is_cri: bool,
    /// Set by the facade when the documentation assistant found
    /// something; never produced by the core pipeline itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_response: Option<EnrichmentResult>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl TriageResult {
    /// The single classification that holds for this result.
    pub fn classification(&self) -> Classification {
        match &self.outcome {
            Outcome::Duplicate { .. } => Classification::Duplicate,
            Outcome::Classified { classification, .. } => *classification,
        }
    }

    /// The matched issue number on the duplicate path.
    pub fn duplicate_of(&self) -> Option<u64> {
        match &self.outcome {
            Outcome::Duplicate { duplicate_of, .. } => *duplicate_of,
            Outcome::Classified { .. } => None,
        }
    }

    /// First suggested area, for callers that only want one tag.
    pub fn primary_area(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Classified {
                suggested_areas, ..
            } => suggested_areas.first().map(String::as_str),
            Outcome::Duplicate { .. } => None,
        }
    }
}

/// Whether the triage engine should touch this issue at all.
///
/// Returns `false` when a human has already classified it or it is
/// already being handled. Callers must check this before `classify`.
pub fn should_process(existing_labels: &[String]) -> bool {
    let blocked = |set: &[&str]| {
        existing_labels
            .iter()
            .any(|label| set.contains(&label.as_str()))
    };
    !blocked(HUMAN_CLASSIFIED_LABELS) && !blocked(IN_PROGRESS_LABELS)
}

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

pub struct IssueClassifier {
    config: TriageConfig,
    backend: Box<dyn ClassifyBackend>,
    docs: Option<Box<dyn DocsAssistant>>,
}

impl IssueClassifier {
    /// Build a classifier from configuration and explicit options.
    pub fn new(config: TriageConfig, options: &TriageOptions) -> Self {
        let backend: Box<dyn ClassifyBackend> = match options.backend {
            BackendKind::Mock => Box::new(MockBackend::new(&config)),
            BackendKind::Live => Box::new(ClaudeBackend::new(options.model.clone())),
        };
        let docs: Option<Box<dyn DocsAssistant>> = match options.enrichment {
            EnrichmentMode::Enabled => {
                Some(Box::new(ClaudeDocsAssistant::new(options.model.clone())))
            }
            EnrichmentMode::Disabled => None,
        };
        Self {
            config,
            backend,
            docs,
        }
    }

    /// Build a classifier around custom collaborators (tests, embedding).
    pub fn with_collaborators(
        config: TriageConfig,
        backend: Box<dyn ClassifyBackend>,
        docs: Option<Box<dyn DocsAssistant>>,
    ) -> Self {
        Self {
            config,
            backend,
            docs,
        }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    /// Classify one issue against an optional snapshot of open issues.
    ///
    /// Pipeline: duplicate short-circuit, backend classification,
    /// policy derivation, detector augmentation, optional enrichment.
    /// Backend and configuration errors propagate; enrichment failures
    /// are absorbed and logged.
    pub fn classify(
        &self,
        issue: &Issue,
        known_open_issues: &[Issue],
    ) -> Result<TriageResult, ClassifyError> {
        if !known_open_issues.is_empty() {
            let similar = find_similar(issue, known_open_issues);
            if let Some(top) = similar.first() {
                if top.score > DUPLICATE_THRESHOLD {
                    log::info!(
                        "issue #{} short-circuited as duplicate of #{} (score {:.2})",
                        issue.number,
                        top.number,
                        top.score
                    );
                    return Ok(self.duplicate_result(&similar)?);
                }
            }
        }

        let raw = self.backend.classify_raw(
            &issue.title,
            &issue.body,
            &self.config.area_names(),
        )?;
        let mut result = policy::derive(&self.config, &raw)?;

        augment(&mut result, &issue.title, &issue.body);

        if let Some(docs) = &self.docs {
            if matches!(
                result.classification(),
                Classification::Bug | Classification::Support | Classification::InfoNeeded
            ) {
                match docs.search_and_answer(&issue.title, &issue.body) {
                    Ok(enrichment) => result.wiki_response = Some(enrichment),
                    Err(e) => {
                        // Enrichment is best-effort and never fatal.
                        log::warn!("documentation enrichment failed: {e}");
                    }
                }
            }
        }

        Ok(result)
    }

    /// Build the short-circuit result for a confirmed duplicate.
    /// `similar` is non-empty and sorted best-first.
    fn duplicate_result(&self, similar: &[SimilarIssue]) -> Result<TriageResult, ConfigError> {
        let top = &similar[0];
        let template = self.config.template("duplicate_issue")?;

        Ok(TriageResult {
            confidence: top.score,
            reasoning: format!(
                "Title/body similarity of {:.2} to issue #{} (\"{}\")",
                top.score, top.number, top.title
            ),
            suggested_labels: vec!["duplicate".to_owned()],
            suggested_response: format!("{template}\n\nDuplicate of #{}.", top.number),
            suggested_assignees: vec![],
            is_cri: false,
            wiki_response: None,
            outcome: Outcome::Duplicate {
                duplicate_of: Some(top.number),
                similar_issues: similar.to_vec(),
            },
        })
    }
}

/// Apply the CRI and security detectors to a derived result.
///
/// Both label groups are additive and may fire together; when they do,
/// the CRI notice precedes the security notice in the response.
fn augment(result: &mut TriageResult, title: &str, body: &str) {
    let mut notices = Vec::new();

    if detect::is_cri(title, body) {
        result.is_cri = true;
        result.suggested_labels.extend([
            "CRI".to_owned(),
            "P0".to_owned(),
            "needs-immediate-attention".to_owned(),
        ]);
        notices.push(CRI_NOTICE);
    }

    if detect::is_security_sensitive(title, body) {
        result.suggested_labels.extend([
            "security".to_owned(),
            "needs-security-review".to_owned(),
        ]);
        result.suggested_assignees = vec![SECURITY_TEAM.to_owned()];
        notices.push(SECURITY_NOTICE);
    }

    if !notices.is_empty() {
        result.suggested_response =
            format!("{}\n\n{}", notices.join("\n\n"), result.suggested_response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::EnrichError;
    use crate::model::ModelError;

    fn issue(number: u64, title: &str, body: &str) -> Issue {
        Issue {
            number,
            title: title.to_owned(),
            body: body.to_owned(),
            author: "reporter".to_owned(),
            created_at: "2024-05-01T00:00:00Z".to_owned(),
            labels: vec![],
        }
    }

    fn classifier() -> IssueClassifier {
        IssueClassifier::new(
            TriageConfig::bundled().unwrap(),
            &TriageOptions::default(),
        )
    }

    struct FailingDocs;
    impl DocsAssistant for FailingDocs {
        fn search_and_answer(&self, _: &str, _: &str) -> Result<EnrichmentResult, EnrichError> {
            Err(EnrichError::Model(ModelError::EmptyResponse))
        }
    }

    struct StubDocs;
    impl DocsAssistant for StubDocs {
        fn search_and_answer(&self, _: &str, _: &str) -> Result<EnrichmentResult, EnrichError> {
            Ok(EnrichmentResult {
                found_relevant_docs: true,
                response: "See the troubleshooting guide.".to_owned(),
                citations_count: 2,
            })
        }
    }

    fn classifier_with_docs(docs: Box<dyn DocsAssistant>) -> IssueClassifier {
        let config = TriageConfig::bundled().unwrap();
        let backend = Box::new(MockBackend::new(&config));
        IssueClassifier::with_collaborators(config, backend, Some(docs))
    }

    #[test]
    fn test_should_process_fresh_issue() {
        assert!(should_process(&["needs-attention".to_owned()]));
        assert!(should_process(&[]));
    }

    #[test]
    fn test_should_process_rejects_human_classified() {
        assert!(!should_process(&["bug".to_owned()]));
        assert!(!should_process(&["SR-Support Request".to_owned()]));
    }

    #[test]
    fn test_should_process_rejects_in_progress() {
        assert!(!should_process(&["Under Investigation".to_owned()]));
        assert!(!should_process(&[
            "some-other".to_owned(),
            "fixing".to_owned()
        ]));
    }

    #[test]
    fn test_duplicate_short_circuit() {
        let candidate = issue(100, "NGINX ingress not routing traffic", "broken");
        let pool = vec![issue(
            42,
            "Ingress NGINX not routing traffic to backend",
            "broken",
        )];

        let result = classifier().classify(&candidate, &pool).unwrap();
        assert_eq!(result.classification(), Classification::Duplicate);
        assert_eq!(result.duplicate_of(), Some(42));
        assert_eq!(result.suggested_labels, vec!["duplicate"]);
        assert!(result.suggested_response.contains("#42"));
        match &result.outcome {
            Outcome::Duplicate { similar_issues, .. } => {
                assert_eq!(result.confidence, similar_issues[0].score);
            }
            Outcome::Classified { .. } => panic!("expected duplicate outcome"),
        }
    }

    #[test]
    fn test_duplicate_short_circuit_skips_detectors() {
        // Even a screaming incident report is only a duplicate when it
        // matches an existing issue closely enough.
        let candidate = issue(100, "URGENT production down outage", "production down");
        let pool = vec![issue(9, "URGENT production down outage", "production down")];

        let result = classifier().classify(&candidate, &pool).unwrap();
        assert_eq!(result.classification(), Classification::Duplicate);
        assert!(!result.is_cri);
        assert!(!result.suggested_labels.iter().any(|l| l == "CRI"));
    }

    #[test]
    fn test_below_threshold_goes_to_backend() {
        let candidate = issue(
            100,
            "Pods evicted during upgrade",
            "happens consistently on every node pool upgrade since last week",
        );
        // Weak overlap only, should not short-circuit.
        let pool = vec![issue(7, "completely unrelated report", "nothing shared")];

        let result = classifier().classify(&candidate, &pool).unwrap();
        assert_ne!(result.classification(), Classification::Duplicate);
    }

    #[test]
    fn test_cri_bug_scenario() {
        let candidate = issue(
            1,
            "Pod crash on startup",
            "production down, all clusters affected, pods crash with OOMKilled consistently and it happens consistently",
        );

        let result = classifier().classify(&candidate, &[]).unwrap();
        assert_eq!(result.classification(), Classification::Bug);
        assert!(result.is_cri);
        for label in ["bug", "triage", "CRI", "P0", "needs-immediate-attention"] {
            assert!(
                result.suggested_labels.iter().any(|l| l == label),
                "missing label {label}"
            );
        }
        assert!(result.suggested_response.starts_with(CRI_NOTICE));
    }

    #[test]
    fn test_short_body_info_needed_scenario() {
        let candidate = issue(2, "Cluster not working", "please fix");

        let result = classifier().classify(&candidate, &[]).unwrap();
        assert_eq!(result.classification(), Classification::InfoNeeded);
        assert_eq!(result.suggested_labels, vec!["Needs Author Feedback"]);
        match &result.outcome {
            Outcome::Classified { missing_info, .. } => assert!(!missing_info.is_empty()),
            Outcome::Duplicate { .. } => panic!("expected classified outcome"),
        }
    }

    #[test]
    fn test_cri_and_security_are_additive_cri_notice_first() {
        let candidate = issue(
            3,
            "privilege escalation in production",
            "urgent: unauthorized access observed, happens consistently across the fleet",
        );

        let result = classifier().classify(&candidate, &[]).unwrap();
        for label in ["CRI", "P0", "security", "needs-security-review"] {
            assert!(result.suggested_labels.iter().any(|l| l == label));
        }
        assert_eq!(result.suggested_assignees, vec![SECURITY_TEAM]);

        let cri_pos = result.suggested_response.find(CRI_NOTICE).unwrap();
        let sec_pos = result.suggested_response.find(SECURITY_NOTICE).unwrap();
        assert!(cri_pos < sec_pos, "CRI notice must precede security notice");
    }

    #[test]
    fn test_security_overrides_assignees() {
        let candidate = issue(
            4,
            "ingress CVE exposure",
            "the nginx ingress image ships a known cve, reproducible steps attached",
        );

        let result = classifier().classify(&candidate, &[]).unwrap();
        // Mock classifies this as a networking bug, so the on-call
        // engineer was suggested first; security replaces it.
        assert_eq!(result.suggested_assignees, vec![SECURITY_TEAM]);
    }

    #[test]
    fn test_enrichment_failure_is_absorbed() {
        let candidate = issue(5, "Pods restart", "restarts happen consistently on every node");

        let result = classifier_with_docs(Box::new(FailingDocs))
            .classify(&candidate, &[])
            .unwrap();
        assert!(result.wiki_response.is_none());
    }

    #[test]
    fn test_enrichment_attached_when_available() {
        let candidate = issue(6, "Pods restart", "restarts happen consistently on every node");

        let result = classifier_with_docs(Box::new(StubDocs))
            .classify(&candidate, &[])
            .unwrap();
        let wiki = result.wiki_response.unwrap();
        assert!(wiki.found_relevant_docs);
        assert_eq!(wiki.citations_count, 2);
    }

    #[test]
    fn test_enrichment_skipped_for_features() {
        let candidate = issue(7, "Feature: add support for ipv6", "would be great");

        let result = classifier_with_docs(Box::new(StubDocs))
            .classify(&candidate, &[])
            .unwrap();
        assert_eq!(result.classification(), Classification::Feature);
        assert!(result.wiki_response.is_none());
    }

    #[test]
    fn test_result_serialization_shape() {
        let candidate = issue(8, "Cluster not working", "short");
        let result = classifier().classify(&candidate, &[]).unwrap();

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["kind"], "classified");
        assert_eq!(json["classification"], "INFO_NEEDED");
    }
}
