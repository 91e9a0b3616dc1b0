//! Classification policy: turns a raw backend classification into the
//! base triage result (labels, response template, assignees, area).
//! Duplicate- and detector-driven fields are filled in later by the
//! facade.

use super::backend::RawClassification;
use super::{Classification, Outcome, TriageResult};
use crate::config::{ConfigError, TriageConfig};

/// Base labels and response template key for each classification.
fn mapping(classification: Classification) -> (&'static [&'static str], &'static str) {
    match classification {
        Classification::Bug => (&["bug", "triage"], "bug_acknowledged"),
        Classification::Support => (&["SR-Support Request"], "support_request"),
        Classification::InfoNeeded => (&["Needs Author Feedback"], "need_more_info"),
        Classification::Feature => (&["feature-request"], "feature_acknowledged"),
        Classification::Duplicate => (&["duplicate"], "duplicate_issue"),
    }
}

/// Derive the base [`TriageResult`] from a backend classification.
///
/// Fails only when the configured template for the classification is
/// missing; there is deliberately no fallback template.
pub fn derive(config: &TriageConfig, raw: &RawClassification) -> Result<TriageResult, ConfigError> {
    let (base_labels, template_key) = mapping(raw.classification);
    let suggested_response = config.template(template_key)?.to_owned();

    // Only confirmed defects get routed to an engineer automatically.
    let suggested_assignees = if raw.classification == Classification::Bug {
        config
            .first_engineer(&raw.suggested_area)
            .map(|e| vec![e.to_owned()])
            .unwrap_or_default()
    } else {
        vec![]
    };

    let outcome = if raw.classification == Classification::Duplicate {
        // Backend-asserted duplicate without a similarity match: there
        // is no issue number to point at, so only the label applies.
        Outcome::Duplicate {
            duplicate_of: None,
            similar_issues: vec![],
        }
    } else {
        Outcome::Classified {
            classification: raw.classification,
            suggested_areas: vec![raw.suggested_area.clone()],
            missing_info: raw.missing_info.clone(),
        }
    };

    Ok(TriageResult {
        confidence: raw.confidence,
        reasoning: raw.reasoning.clone(),
        suggested_labels: base_labels.iter().map(|&l| l.to_owned()).collect(),
        suggested_response,
        suggested_assignees,
        is_cri: false,
        wiki_response: None,
        outcome,
    })
}
