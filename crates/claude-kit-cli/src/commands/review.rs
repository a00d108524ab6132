use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use super::{with_default_temperature, with_spinner};
use crate::output::{print_markdown, Theme};
use crate::samples;
use claude_kit::prompt_template::{builtin_prompt, render_prompt};
use claude_kit::providers::base::CompletionOptions;
use claude_kit::ClaudeClient;

pub async fn execute(
    client: &ClaudeClient,
    options: &CompletionOptions,
    path: Option<&Path>,
    language: Option<String>,
    audit: bool,
) -> Result<()> {
    let code = samples::read_input(path, samples::CODE)?;
    let language = language.unwrap_or_else(|| infer_language(path).to_string());

    let (system, temperature) = if audit {
        (builtin_prompt("security_audit.md")?, 0.2)
    } else {
        (builtin_prompt("code_review.md")?, 0.3)
    };
    let request = render_prompt(
        "review_request.md",
        &json!({
            "audit": audit,
            "path": path.map(|p| p.display().to_string()).unwrap_or_default(),
            "language": language,
            "code": code.trim_end(),
        }),
    )?;

    let options = with_default_temperature(options, temperature).with_system(system);
    let review = with_spinner("reviewing", client.chat(&request, &options))
        .await
        .context("Review request failed")?;
    print_markdown(&review, Theme::Dark)
}

/// Fence language for a source file, from its extension
fn infer_language(path: Option<&Path>) -> &str {
    let Some(extension) = path.and_then(|p| p.extension()).and_then(|e| e.to_str()) else {
        // The built-in sample is Python
        return "python";
    };
    match extension {
        "py" => "python",
        "rs" => "rust",
        "js" | "mjs" => "javascript",
        "ts" => "typescript",
        "rb" => "ruby",
        "sh" => "bash",
        "kt" => "kotlin",
        other => other,
    }
}
