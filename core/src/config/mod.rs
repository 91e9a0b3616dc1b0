//! Triage configuration.
//!
//! A single JSON document with three mappings: `keywords` (area name to
//! keyword list), `engineers` (area name to on-call roster), and
//! `templates` (template key to canned response). Loaded once at
//! startup and read-only afterwards. A bundled default ships with the
//! crate; an explicit path overrides it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Template keys that must be present for classification to work.
/// Their absence is a startup-time error, never a runtime fallback.
pub const REQUIRED_TEMPLATES: &[&str] = &[
    "bug_acknowledged",
    "support_request",
    "need_more_info",
    "feature_acknowledged",
    "duplicate_issue",
];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed triage configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("missing required response template '{0}'")]
    MissingTemplate(String),
}

/// Read-only triage configuration.
///
/// Maps use `BTreeMap` so area iteration order is stable; the mock
/// backend picks the first matching area, and that pick must be
/// deterministic across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// Area name -> keywords used for area inference.
    pub keywords: BTreeMap<String, Vec<String>>,
    /// Area name -> engineer handles, first entry is on call.
    pub engineers: BTreeMap<String, Vec<String>>,
    /// Template key -> canned response text.
    pub templates: BTreeMap<String, String>,
}

impl TriageConfig {
    /// Load the configuration bundled with the crate.
    pub fn bundled() -> Result<Self, ConfigError> {
        Self::from_json(include_str!("../../resources/triage-config.json"))
    }

    /// Load configuration from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate a configuration document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        for key in REQUIRED_TEMPLATES {
            if !self.templates.contains_key(*key) {
                return Err(ConfigError::MissingTemplate((*key).to_owned()));
            }
        }
        Ok(self)
    }

    /// The configured area vocabulary, in stable order.
    pub fn area_names(&self) -> Vec<String> {
        self.keywords.keys().cloned().collect()
    }

    /// Look up a response template. Validation guarantees the required
    /// keys exist, but lookups stay fallible so a hand-built config
    /// cannot silently substitute another template.
    pub fn template(&self, key: &str) -> Result<&str, ConfigError> {
        self.templates
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingTemplate(key.to_owned()))
    }

    /// The on-call engineer for an area, if one is configured.
    pub fn first_engineer(&self, area: &str) -> Option<&str> {
        self.engineers
            .get(area)
            .and_then(|list| list.first())
            .map(String::as_str)
    }
}

/// Which classification backend to use. Always selected explicitly,
/// never inferred from credential contents or ambient environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Deterministic keyword/length rules, no network.
    Mock,
    /// Delegate to the model CLI.
    Live,
}

/// Whether documentation enrichment runs after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentMode {
    Enabled,
    Disabled,
}

/// Options fixed at classifier construction time.
#[derive(Debug, Clone)]
pub struct TriageOptions {
    pub backend: BackendKind,
    pub enrichment: EnrichmentMode,
    /// Model name passed to the model CLI (live backend and enrichment).
    pub model: String,
}

impl Default for TriageOptions {
    fn default() -> Self {
        Self {
            backend: BackendKind::Mock,
            enrichment: EnrichmentMode::Disabled,
            model: "sonnet".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_bundled_config_loads() {
        let config = TriageConfig::bundled().unwrap();
        assert!(!config.keywords.is_empty());
        assert!(config.templates.contains_key("bug_acknowledged"));
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let json = r#"{
            "keywords": {"networking": ["ingress"]},
            "engineers": {"networking": ["@alice"]},
            "templates": {"bug_acknowledged": "thanks"}
        }"#;

        let err = TriageConfig::from_json(json).unwrap_err();
        assert!(matches!(err, ConfigError::MissingTemplate(_)));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let err = TriageConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_from_path_round_trip() {
        let config = TriageConfig::bundled().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = TriageConfig::from_path(file.path()).unwrap();
        assert_eq!(loaded.area_names(), config.area_names());
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = TriageConfig::from_path(Path::new("/does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_first_engineer() {
        let config = TriageConfig::bundled().unwrap();
        assert!(config.first_engineer("networking").is_some());
        assert!(config.first_engineer("no-such-area").is_none());
    }

    #[test]
    fn test_template_lookup_unknown_key() {
        let config = TriageConfig::bundled().unwrap();
        assert!(config.template("nonexistent_template").is_err());
    }
}
