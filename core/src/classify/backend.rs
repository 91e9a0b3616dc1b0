//! Pluggable classification backend.
//!
//! The facade only sees [`ClassifyBackend`]; which implementation is
//! behind it is decided by an explicit [`crate::config::BackendKind`]
//! at construction, never by inspecting credentials.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Classification;
use crate::config::TriageConfig;
use crate::model::ModelError;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("classification backend failed: {0}")]
    Model(#[from] ModelError),
    #[error("backend returned invalid payload: {0}")]
    Invalid(String),
}

/// Raw backend output, before policy derivation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawClassification {
    pub classification: Classification,
    pub confidence: f64,
    pub reasoning: String,
    /// Single canonical area name. Earlier revisions of the upstream
    /// tool also emitted `area_labels` lists; this accepts the alias
    /// but always treats the value as one area.
    #[serde(alias = "area")]
    pub suggested_area: String,
    #[serde(default)]
    pub missing_info: Vec<String>,
}

/// Turns raw issue text into a preliminary classification.
pub trait ClassifyBackend: Send + Sync {
    fn classify_raw(
        &self,
        title: &str,
        body: &str,
        areas: &[String],
    ) -> Result<RawClassification, BackendError>;
}

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// Deterministic keyword/length classifier for tests and offline runs.
/// No network, no subprocess.
pub struct MockBackend {
    keywords: std::collections::BTreeMap<String, Vec<String>>,
}

impl MockBackend {
    pub fn new(config: &TriageConfig) -> Self {
        Self {
            keywords: config.keywords.clone(),
        }
    }

    fn infer_area(&self, title: &str, body: &str) -> String {
        for (area, keywords) in &self.keywords {
            if keywords
                .iter()
                .any(|kw| title.contains(kw.as_str()) || body.contains(kw.as_str()))
            {
                return area.clone();
            }
        }
        "other".to_owned()
    }
}

impl ClassifyBackend for MockBackend {
    fn classify_raw(
        &self,
        title: &str,
        body: &str,
        _areas: &[String],
    ) -> Result<RawClassification, BackendError> {
        let title_lower = title.to_lowercase();
        let body_lower = body.to_lowercase();

        let classification = if title_lower.contains("feature")
            || title_lower.contains("add support")
        {
            Classification::Feature
        } else if body.len() < 50 {
            Classification::InfoNeeded
        } else if body_lower.contains("reproducible steps")
            || body_lower.contains("happens consistently")
        {
            Classification::Bug
        } else {
            Classification::Support
        };

        let missing_info = if classification == Classification::InfoNeeded {
            vec!["cluster version".to_owned(), "region".to_owned()]
        } else {
            vec![]
        };

        Ok(RawClassification {
            classification,
            confidence: 0.85,
            reasoning: "Classified from keywords and content length".to_owned(),
            suggested_area: self.infer_area(&title_lower, &body_lower),
            missing_info,
        })
    }
}
