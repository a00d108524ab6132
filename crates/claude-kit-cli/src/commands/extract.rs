use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

use super::{with_default_temperature, with_spinner};
use crate::output::{print_json, Theme};
use crate::samples;
use claude_kit::prompt_template::builtin_prompt;
use claude_kit::providers::base::CompletionOptions;
use claude_kit::structured::parse_json;
use claude_kit::ClaudeClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Extraction {
    /// Names, titles and contact details
    Contacts,
    /// Financial metrics, growth and deals
    Financial,
    /// Dated events
    Events,
}

impl Extraction {
    fn template(&self) -> &'static str {
        match self {
            Extraction::Contacts => "extract/contacts.md",
            Extraction::Financial => "extract/financial.md",
            Extraction::Events => "extract/events.md",
        }
    }

    fn sample(&self) -> &'static str {
        match self {
            Extraction::Contacts => samples::CONTACTS,
            Extraction::Financial => samples::FINANCIAL,
            Extraction::Events => samples::EVENTS,
        }
    }

    fn request(&self, text: &str) -> String {
        let instruction = match self {
            Extraction::Contacts => "Extract all contact information from this text:",
            Extraction::Financial => "Extract financial data from this report:",
            Extraction::Events => "Extract all events from this text:",
        };
        format!("{}\n\n{}", instruction, text.trim())
    }

    fn temperature(&self) -> f32 {
        match self {
            Extraction::Financial => 0.1,
            _ => 0.2,
        }
    }
}

/// Run an extraction and return the parsed document
pub async fn extract(
    client: &ClaudeClient,
    options: &CompletionOptions,
    kind: Extraction,
    text: &str,
) -> Result<Value> {
    let system = builtin_prompt(kind.template())?;
    let options = with_default_temperature(options, kind.temperature()).with_system(system);
    let reply = with_spinner("extracting", client.chat(&kind.request(text), &options))
        .await
        .context("Extraction request failed")?;
    Ok(parse_json(&reply)?)
}

pub async fn execute(
    client: &ClaudeClient,
    options: &CompletionOptions,
    kind: Extraction,
    path: Option<&Path>,
) -> Result<()> {
    let text = samples::read_input(path, kind.sample())?;
    let document = extract(client, options, kind, &text).await?;
    print_json(&document, Theme::Dark)
}
