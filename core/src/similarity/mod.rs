//! Text-similarity scoring for duplicate detection.
//!
//! Compares an incoming issue against a snapshot of known open issues
//! using a Ratcliff/Obershelp ratio over lowercased titles and bodies,
//! plus exact matching of extracted `error:` lines. No I/O.

use crate::sources::traits::Issue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// A title this similar is a match on its own.
pub const STRONG_TITLE_THRESHOLD: f64 = 0.8;
/// A weaker title match still counts when the bodies also line up.
pub const WEAK_TITLE_THRESHOLD: f64 = 0.6;
/// Body threshold paired with [`WEAK_TITLE_THRESHOLD`].
pub const BODY_THRESHOLD: f64 = 0.7;
/// At most this many similar issues are reported.
pub const MAX_SIMILAR: usize = 3;

/// A known open issue that scored as similar to the candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarIssue {
    pub number: u64,
    pub title: String,
    pub score: f64,
    /// True when both bodies contain an identical extracted error line.
    pub error_match: bool,
}

/// Normalized similarity ratio in `[0, 1]` between two strings.
///
/// This is the Ratcliff/Obershelp measure: twice the total length of
/// the recursively-found longest matching blocks divided by the summed
/// lengths. Two empty strings are identical by definition (ratio 1.0).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_len(&a, &b) as f64 / total as f64
}

/// Longest common substring of `a` and `b`.
/// Returns (start in a, start in b, length); length 0 when disjoint.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        let mut cur = vec![0usize; b.len() + 1];
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                let len = prev[j] + 1;
                cur[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        prev = cur;
    }

    best
}

/// Total length of matching blocks: take the longest common substring,
/// then recurse into the pieces to its left and right.
fn matching_len(a: &[char], b: &[char]) -> usize {
    let (ia, ib, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_len(&a[..ia], &b[..ib]) + matching_len(&a[ia + len..], &b[ib + len..])
}

fn error_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)error[:\s]+(.+)").expect("error-line pattern is a valid regex")
    })
}

/// Extract the `error: <rest-of-line>` substrings from an issue body.
///
/// Captures are trimmed and lowercased so that `Error: Foo` and
/// `error: foo` compare equal.
pub fn extract_error_lines(body: &str) -> HashSet<String> {
    error_line_re()
        .captures_iter(body)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Score `candidate` against every other issue in `pool` and return the
/// matches, best first, truncated to [`MAX_SIMILAR`].
///
/// An entry matches when its title ratio exceeds
/// [`STRONG_TITLE_THRESHOLD`], or both title and body ratios exceed the
/// weaker pair of thresholds, or both bodies share an extracted error
/// line. The reported score is the larger of the two ratios.
pub fn find_similar(candidate: &Issue, pool: &[Issue]) -> Vec<SimilarIssue> {
    let title = candidate.title.to_lowercase();
    let body = candidate.body.to_lowercase();
    let error_lines = extract_error_lines(&body);

    let mut matches: Vec<SimilarIssue> = pool
        .iter()
        .filter(|other| other.number != candidate.number)
        .filter_map(|other| {
            let other_title = other.title.to_lowercase();
            let other_body = other.body.to_lowercase();

            let title_similarity = ratio(&title, &other_title);
            let body_similarity = ratio(&body, &other_body);
            let error_match = !error_lines.is_empty()
                && extract_error_lines(&other_body)
                    .intersection(&error_lines)
                    .next()
                    .is_some();

            let is_match = title_similarity > STRONG_TITLE_THRESHOLD
                || (title_similarity > WEAK_TITLE_THRESHOLD
                    && body_similarity > BODY_THRESHOLD)
                || error_match;

            is_match.then(|| SimilarIssue {
                number: other.number,
                title: other.title.clone(),
                score: title_similarity.max(body_similarity),
                error_match,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    matches.truncate(MAX_SIMILAR);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(number: u64, title: &str, body: &str) -> Issue {
        Issue {
            number,
            title: title.to_owned(),
            body: body.to_owned(),
            author: "tester".to_owned(),
            created_at: "2024-01-01T00:00:00Z".to_owned(),
            labels: vec![],
        }
    }

    #[test]
    fn test_ratio_identical_strings() {
        assert_eq!(ratio("pods crash on startup", "pods crash on startup"), 1.0);
    }

    #[test]
    fn test_ratio_empty_strings() {
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn test_ratio_disjoint_strings() {
        let r = ratio("aaaa", "zzzz");
        assert_eq!(r, 0.0);
    }

    #[test]
    fn test_ratio_partial_overlap() {
        let r = ratio("kubernetes", "kubernetic");
        assert!(r > 0.7 && r < 1.0);
    }

    #[test]
    fn test_extract_error_lines() {
        let body = "Deployment fails.\nError: ImagePullBackOff\nthen error   crashloop";
        let lines = extract_error_lines(body);
        assert!(lines.contains("imagepullbackoff"));
        assert!(lines.contains("crashloop"));
    }

    #[test]
    fn test_extract_error_lines_none() {
        assert!(extract_error_lines("everything is fine").is_empty());
    }

    #[test]
    fn test_identical_issue_is_a_match_with_score_one() {
        let candidate = issue(10, "Pod crash on startup", "pods crash with OOMKilled");
        let pool = vec![issue(7, "Pod crash on startup", "pods crash with OOMKilled")];

        let similar = find_similar(&candidate, &pool);
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].number, 7);
        assert_eq!(similar[0].score, 1.0);
    }

    #[test]
    fn test_near_identical_titles_match() {
        // Bodies are disjoint, so only the title ratio can match here.
        let candidate = issue(1, "NGINX ingress not routing traffic", "aaaa aaaa");
        let pool = vec![issue(
            2,
            "NGINX ingress not routing any traffic",
            "zzzz zzzz",
        )];

        let similar = find_similar(&candidate, &pool);
        assert_eq!(similar.len(), 1);
        assert!(similar[0].score > STRONG_TITLE_THRESHOLD);
    }

    #[test]
    fn test_weak_title_needs_body_support() {
        // Reordered words drop the title ratio into the weak band; the
        // shared body is what makes this a match.
        let candidate = issue(1, "NGINX ingress not routing traffic", "error: upstream timed out");
        let strong_body = issue(
            2,
            "Ingress NGINX not routing traffic to backend",
            "error: upstream timed out",
        );

        let similar = find_similar(&candidate, &[strong_body]);
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].score, 1.0);
    }

    #[test]
    fn test_disjoint_issues_do_not_match() {
        let candidate = issue(1, "zzz qqq xxx", "completely unrelated words here");
        let pool = vec![issue(2, "alpha beta gamma", "different vocabulary entirely")];

        assert!(find_similar(&candidate, &pool).is_empty());
    }

    #[test]
    fn test_error_match_alone_is_sufficient() {
        let candidate = issue(
            1,
            "zzz qqq",
            "something broke\nerror: connection refused to 10.0.0.1",
        );
        let pool = vec![issue(
            2,
            "totally different title words",
            "other text\nERROR: connection refused to 10.0.0.1",
        )];

        let similar = find_similar(&candidate, &pool);
        assert_eq!(similar.len(), 1);
        assert!(similar[0].error_match);
    }

    #[test]
    fn test_candidate_excluded_from_pool() {
        let candidate = issue(5, "Pod crash on startup", "body");
        let pool = vec![candidate.clone()];

        assert!(find_similar(&candidate, &pool).is_empty());
    }

    #[test]
    fn test_empty_pool() {
        let candidate = issue(1, "anything", "at all");
        assert!(find_similar(&candidate, &[]).is_empty());
    }

    #[test]
    fn test_results_sorted_and_truncated_to_top_three() {
        let candidate = issue(0, "ingress controller returns 502 errors", "mmmm");
        let pool = vec![
            issue(1, "ingress controller returns 502 error", "qqqq"),
            issue(2, "ingress controller returns 502 errors", "vvvv"),
            issue(3, "ingress controller return 502 errors", "wwww"),
            issue(4, "the ingress controller returns 502 errors", "yyyy"),
        ];

        let similar = find_similar(&candidate, &pool);
        assert_eq!(similar.len(), MAX_SIMILAR);
        assert_eq!(similar[0].number, 2);
        assert!(similar.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
