use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

use super::{with_default_temperature, with_spinner};
use crate::output::{print_markdown, Theme};
use crate::samples;
use claude_kit::prompt_template::render_prompt;
use claude_kit::providers::base::CompletionOptions;
use claude_kit::ClaudeClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SummaryStyle {
    /// Three to four sentences
    #[default]
    Brief,
    /// Summary, key points and a takeaway
    Structured,
    /// At most two sentences
    Executive,
    /// For readers without a technical background
    Layperson,
}

impl SummaryStyle {
    fn name(&self) -> &'static str {
        match self {
            SummaryStyle::Brief => "brief",
            SummaryStyle::Structured => "structured",
            SummaryStyle::Executive => "executive",
            SummaryStyle::Layperson => "layperson",
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            SummaryStyle::Brief => "Summarize this article in 3-4 sentences:",
            SummaryStyle::Structured => "Create a structured summary of this article:",
            SummaryStyle::Executive => "Create an executive summary:",
            SummaryStyle::Layperson => {
                "Explain this article to someone with no technical background:"
            }
        }
    }

    fn temperature(&self) -> f32 {
        match self {
            SummaryStyle::Layperson => 0.4,
            _ => 0.3,
        }
    }
}

pub async fn execute(
    client: &ClaudeClient,
    options: &CompletionOptions,
    path: Option<&Path>,
    style: SummaryStyle,
) -> Result<()> {
    let article = samples::read_input(path, samples::ARTICLE)?;
    let system = render_prompt("summarize.md", &json!({ "style": style.name() }))?;
    let options = with_default_temperature(options, style.temperature()).with_system(system);

    let request = format!("{}\n\n{}", style.instruction(), article.trim());
    let summary = with_spinner("summarizing", client.chat(&request, &options))
        .await
        .context("Summary request failed")?;
    print_markdown(&summary, Theme::Dark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude_kit::providers::mock::MockProvider;

    #[tokio::test]
    async fn test_executive_summary_request() -> Result<()> {
        let provider = MockProvider::new(vec![MockProvider::text("AI is changing healthcare.")]);
        let client = ClaudeClient::new(Box::new(provider.clone()), CompletionOptions::default());

        let temp_dir = tempfile::tempdir()?;
        let file_path = temp_dir.path().join("article.md");
        std::fs::write(&file_path, samples::ARTICLE)?;

        execute(&client, client.options(), Some(&file_path), SummaryStyle::Executive).await?;

        let request = provider.requests()[0][0].text().unwrap_or_default();
        assert_eq!(
            request,
            format!("Create an executive summary:\n\n{}", samples::ARTICLE.trim())
        );
        Ok(())
    }

    #[test]
    fn test_explicit_temperature_wins() {
        let options = CompletionOptions::default().with_temperature(0.9);
        let options = with_default_temperature(&options, SummaryStyle::Brief.temperature());
        assert_eq!(options.temperature, Some(0.9));

        let options = with_default_temperature(&CompletionOptions::default(), 0.3);
        assert_eq!(options.temperature, Some(0.3));
    }
}
