use anyhow::{Context, Result};
use claude_kit::prompt_template::builtin_prompt;
use claude_kit::providers::base::CompletionOptions;
use claude_kit::structured::parse_json;
use claude_kit::ClaudeClient;
use console::style;
use serde::{Deserialize, Serialize};

use super::{with_default_temperature, with_spinner};
use crate::output::{print_json, Theme};

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product: String,
    pub price: f64,
    pub key_features: Vec<String>,
    pub sentiment: String,
}

/// Extract a [`ProductInfo`] from a free-text product description
pub async fn execute(client: &ClaudeClient, options: &CompletionOptions, text: &str) -> Result<()> {
    let options = request_options(options)?;
    let reply = with_spinner("extracting", client.chat(text, &options))
        .await
        .context("Extraction request failed")?;

    let info: ProductInfo = parse_json(&reply)?;
    print_json(&serde_json::to_value(&info)?, Theme::Dark)?;

    println!("{} {}", style("Product:").bold(), info.product);
    println!("{} ${:.2}", style("Price:").bold(), info.price);
    println!("{} {}", style("Features:").bold(), info.key_features.join(", "));
    println!("{} {}", style("Sentiment:").bold(), info.sentiment);
    Ok(())
}

/// Extraction prompt at temperature 0 for consistent formatting
fn request_options(options: &CompletionOptions) -> Result<CompletionOptions> {
    Ok(with_default_temperature(options, 0.0).with_system(builtin_prompt("structured.md")?))
}
