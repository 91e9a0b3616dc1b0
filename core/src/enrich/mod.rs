//! Documentation enrichment.
//!
//! An optional collaborator that searches product documentation for an
//! answer to attach alongside the triage response. Absence and failure
//! both degrade gracefully: the facade logs and leaves the result's
//! `wiki_response` unset, it never propagates an [`EnrichError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{extract_json, run_model, ModelError};

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("documentation search failed: {0}")]
    Model(#[from] ModelError),
}

/// Structured documentation-search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub found_relevant_docs: bool,
    /// Markdown answer to append to the triage comment.
    pub response: String,
    #[serde(default)]
    pub citations_count: u32,
}

/// Searches documentation and drafts an answer for an issue.
pub trait DocsAssistant: Send + Sync {
    fn search_and_answer(&self, title: &str, body: &str)
        -> Result<EnrichmentResult, EnrichError>;
}

/// [`DocsAssistant`] backed by the model CLI with web access left to
/// the model's own tooling.
pub struct ClaudeDocsAssistant {
    model: String,
}

impl ClaudeDocsAssistant {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl DocsAssistant for ClaudeDocsAssistant {
    fn search_and_answer(
        &self,
        title: &str,
        body: &str,
    ) -> Result<EnrichmentResult, EnrichError> {
        let prompt = build_docs_prompt(title, body);
        let output = run_model(&prompt, &self.model)?;
        let result: EnrichmentResult = extract_json(&output)?;
        Ok(result)
    }
}

fn build_docs_prompt(title: &str, body: &str) -> String {
    format!(
        r#"You are a support assistant for a managed Kubernetes service. Search the product documentation you know for material relevant to this issue and draft a concise, actionable answer in markdown. Include specific commands or configuration where relevant.

**Issue Title:** {title}

**Issue Description:** {body}

Respond with JSON only:
{{
  "found_relevant_docs": true|false,
  "response": "markdown answer",
  "citations_count": <number of documentation pages referenced>
}}"#
    )
}
