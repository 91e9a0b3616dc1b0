use serde::Serialize;
use thiserror::Error;

/// Unified error type for the triage application.
///
/// Structured so CLI consumers can serialize it to JSON and decide
/// whether a retry makes sense.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Tracker error: {message}")]
    Tracker { message: String, operation: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn tracker(message: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Tracker {
            message: message.into(),
            operation: operation.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (caller can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Backend calls and tracker operations can be retried,
            // and IO issues may be transient.
            Self::Backend { .. } | Self::Tracker { .. } | Self::Io { .. } => true,
            // A bad config or a missing resource will not change on retry.
            Self::Configuration { .. } | Self::NotFound { .. } => false,
        }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::configuration(err.to_string())
    }
}

impl From<crate::classify::ClassifyError> for AppError {
    fn from(err: crate::classify::ClassifyError) -> Self {
        use crate::classify::ClassifyError;
        match err {
            ClassifyError::Config(e) => AppError::configuration(e.to_string()),
            ClassifyError::Backend(e) => AppError::backend(e.to_string()),
            ClassifyError::Task(msg) => AppError::backend(msg),
        }
    }
}

impl From<crate::sources::github::GhError> for AppError {
    fn from(err: crate::sources::github::GhError) -> Self {
        use crate::sources::github::GhError;
        match err {
            GhError::Io(msg) => AppError::io(msg),
            GhError::Command(msg) => AppError::tracker(msg, "gh"),
            GhError::Parse(msg) => AppError::tracker(msg, "parse"),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::io(err.to_string())
    }
}

impl From<AppError> for String {
    fn from(err: AppError) -> Self {
        err.to_string()
    }
}
