//! Shared plumbing for the model CLI.
//!
//! Both the live classification backend and the documentation assistant
//! shell out to the `claude` CLI with a prompt on stdin and expect a
//! JSON object somewhere in the reply. Callers own timeout and retry;
//! a call either completes or returns an error.

use serde::de::DeserializeOwned;
use std::io::Write;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("claude CLI not found. Install from https://claude.ai/code")]
    CliNotFound,
    #[error("model command failed: {0}")]
    CommandFailed(String),
    #[error("empty response from model")]
    EmptyResponse,
    #[error("failed to parse model response: {0}")]
    Parse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Check if the model CLI is available.
pub fn check_model_available() -> bool {
    find_model_executable().is_some()
}

/// Find the claude executable in PATH.
pub(crate) fn find_model_executable() -> Option<String> {
    let candidates = if cfg!(target_os = "windows") {
        vec!["claude.exe", "claude.cmd", "claude.bat"]
    } else {
        vec!["claude"]
    };
    let which_cmd = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };

    for candidate in candidates {
        if let Ok(output) = Command::new(which_cmd).arg(candidate).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .next()
                    .unwrap_or("")
                    .trim()
                    .to_owned();
                if !path.is_empty() {
                    return Some(path);
                }
            }
        }
    }

    None
}

/// Run the model CLI with the given prompt and model name.
///
/// The prompt is piped via stdin to avoid OS argument length limits;
/// issue bodies can be arbitrarily large.
pub(crate) fn run_model(prompt: &str, model: &str) -> Result<String, ModelError> {
    let path = find_model_executable().ok_or(ModelError::CliNotFound)?;

    let mut child = Command::new(path)
        .args([
            "--print",
            "--model",
            model,
            "--setting-sources",
            "",
            "--disable-slash-commands",
            "--strict-mcp-config",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ModelError::CommandFailed(e.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(prompt.as_bytes())
            .map_err(|e| ModelError::CommandFailed(format!("failed to write prompt: {e}")))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| ModelError::CommandFailed(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let detail = if stderr.is_empty() {
            output
                .status
                .code()
                .map_or_else(|| "killed by signal".to_owned(), |c| format!("exit code {c}"))
        } else {
            stderr
        };
        return Err(ModelError::CommandFailed(detail));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if stdout.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }

    Ok(stdout)
}

/// Truncate for error messages without splitting a UTF-8 sequence.
fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Extract the JSON substring from model output, handling markdown
/// fences and surrounding prose, and deserialize it.
pub(crate) fn extract_json<T: DeserializeOwned>(output: &str) -> Result<T, ModelError> {
    let json_str = extract_json_str(output)?;
    serde_json::from_str(json_str).map_err(|e| {
        ModelError::Parse(format!(
            "JSON parse error: {}. Input: {}",
            e,
            truncate_at_boundary(json_str, 500)
        ))
    })
}

fn extract_json_str(output: &str) -> Result<&str, ModelError> {
    let trimmed = output.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_marker = &trimmed[start + 7..];
        if let Some(end) = after_marker.find("```") {
            return Ok(after_marker[..end].trim());
        }
        return Ok(after_marker.trim());
    }

    if let Some(start) = trimmed.find("```") {
        let after_marker = &trimmed[start + 3..];
        let after_newline = after_marker
            .find('\n')
            .map_or(after_marker, |i| &after_marker[i + 1..]);
        if let Some(end) = after_newline.find("```") {
            return Ok(after_newline[..end].trim());
        }
        return Ok(after_newline.trim());
    }

    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            return Ok(&trimmed[start..=end]);
        }
        return Err(ModelError::Parse(
            "could not find complete JSON object".to_owned(),
        ));
    }

    Err(ModelError::Parse(format!(
        "no JSON found in output: {}",
        truncate_at_boundary(trimmed, 200)
    )))
}
