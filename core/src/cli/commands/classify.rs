use crate::classify::IssueClassifier;
use crate::cli::OutputFormat;
use crate::config::TriageOptions;
use crate::sources::traits::Issue;

/// Classify ad-hoc issue text. Nothing is fetched and nothing is
/// written back, so this works without gh and without a repo.
pub fn run(
    config_path: Option<&str>,
    options: &TriageOptions,
    title: &str,
    body: &str,
    format: OutputFormat,
) -> Result<(), String> {
    let config = super::load_config(config_path)?;
    super::ensure_model_available(options)?;
    let classifier = IssueClassifier::new(config, options);

    let issue = Issue {
        number: 0,
        title: title.to_owned(),
        body: body.to_owned(),
        author: String::new(),
        created_at: String::new(),
        labels: vec![],
    };

    let result = classifier
        .classify(&issue, &[])
        .map_err(|e| format!("classification failed: {e}"))?;

    match format {
        OutputFormat::Json => super::print_json(&result)?,
        OutputFormat::Text => super::print_result(issue.number, &result),
    }
    Ok(())
}
