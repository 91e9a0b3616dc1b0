//! Live classification backend over the model CLI.

use super::backend::{BackendError, ClassifyBackend, RawClassification};
use super::prompt::build_classification_prompt;
use crate::model::{extract_json, run_model};

/// [`ClassifyBackend`] that delegates to the `claude` CLI with a fixed
/// prompt template and parses the structured JSON reply.
pub struct ClaudeBackend {
    model: String,
}

impl ClaudeBackend {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl ClassifyBackend for ClaudeBackend {
    fn classify_raw(
        &self,
        title: &str,
        body: &str,
        areas: &[String],
    ) -> Result<RawClassification, BackendError> {
        let prompt = build_classification_prompt(title, body, areas);
        let output = run_model(&prompt, &self.model)?;
        let raw: RawClassification = extract_json(&output)?;
        validate(raw)
    }
}

/// Reject payloads the model technically parsed but that violate the
/// backend contract.
fn validate(mut raw: RawClassification) -> Result<RawClassification, BackendError> {
    if !raw.confidence.is_finite() {
        return Err(BackendError::Invalid(format!(
            "confidence is not a number: {}",
            raw.confidence
        )));
    }
    raw.confidence = raw.confidence.clamp(0.0, 1.0);

    if raw.reasoning.trim().is_empty() {
        raw.reasoning = "No reasoning provided by the backend".to_owned();
    }
    if raw.suggested_area.trim().is_empty() {
        raw.suggested_area = "other".to_owned();
    }

    Ok(raw)
}
