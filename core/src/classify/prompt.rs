use std::fmt::Write;

/// Build the classification prompt for one issue.
///
/// Enumerates the five categories and the configured area vocabulary,
/// and demands a strict JSON object so the reply can be parsed without
/// guessing.
pub fn build_classification_prompt(title: &str, body: &str, areas: &[String]) -> String {
    let mut area_list = String::new();
    for area in areas {
        let _ = write!(area_list, "{area}, ");
    }
    let area_list = area_list.trim_end_matches(", ");

    format!(
        r#"You are a triage classifier for a managed Kubernetes service's GitHub repository. Analyze the following issue and classify it.

Issue Title: {title}
Issue Body: {body}

Classify as exactly one of:
1. BUG - Clear product defect with reproducible steps
2. SUPPORT - Customer-specific issue needing investigation
3. INFO_NEEDED - Insufficient information to classify
4. DUPLICATE - Similar to an existing issue
5. FEATURE - Feature request, not a bug

Also identify the affected area from: {area_list}

Respond with JSON only:
{{
  "classification": "BUG|SUPPORT|INFO_NEEDED|DUPLICATE|FEATURE",
  "confidence": 0.0-1.0,
  "reasoning": "brief explanation",
  "suggested_area": "area name",
  "missing_info": ["list of missing details if applicable"]
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_contains_categories_and_areas() {
        let areas = vec!["networking".to_owned(), "storage".to_owned()];
        let prompt = build_classification_prompt("Pod crash", "OOMKilled loop", &areas);

        for category in ["BUG", "SUPPORT", "INFO_NEEDED", "DUPLICATE", "FEATURE"] {
            assert!(prompt.contains(category), "missing category {category}");
        }
        assert!(prompt.contains("networking, storage"));
        assert!(prompt.contains("Pod crash"));
        assert!(prompt.contains("OOMKilled loop"));
    }
}
