//! Issue triage engine for a Kubernetes-service repository.
//!
//! The core is the classification and duplicate-detection engine:
//! similarity scoring against known open issues, incident/security
//! heuristics, and a policy that turns a backend classification into
//! labels, responses, and assignees. Everything that talks to GitHub
//! or a model lives behind traits so callers can swap or mock it.

pub mod classify;
pub mod config;
pub mod detect;
pub mod enrich;
pub mod error;
pub mod model;
pub mod similarity;
pub mod sources;

#[cfg(feature = "cli")]
pub mod cli;
