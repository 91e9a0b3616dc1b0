//! Heuristic detectors over issue text.
//!
//! Pure predicates: no ordering dependency between them, no I/O. Both
//! use plain substring containment without word-boundary anchoring, so
//! "urgent" also fires inside "non-urgent". That imprecision is known
//! and kept; the detectors bias toward escalating.

/// Keywords that mark a customer-reported incident (CRI).
const CRI_KEYWORDS: &[&str] = &[
    "production down",
    "urgent",
    "critical",
    "emergency",
    "outage",
    "all clusters affected",
    "business impact",
    "severity 1",
    "sev1",
    "p0",
    "blocker",
];

/// Keywords that mark a potentially security-sensitive issue.
const SECURITY_KEYWORDS: &[&str] = &[
    "security",
    "vulnerability",
    "cve",
    "exploit",
    "privilege escalation",
    "unauthorized access",
    "data breach",
    "exposure",
    "injection",
];

fn contains_any(title: &str, body: &str, keywords: &[&str]) -> bool {
    let text = format!("{} {}", title.to_lowercase(), body.to_lowercase());
    keywords.iter().any(|kw| text.contains(kw))
}

/// True when the issue looks like a production-impacting incident.
pub fn is_cri(title: &str, body: &str) -> bool {
    contains_any(title, body, CRI_KEYWORDS)
}

/// True when the issue mentions security-sensitive material.
pub fn is_security_sensitive(title: &str, body: &str) -> bool {
    contains_any(title, body, SECURITY_KEYWORDS)
}
