use anyhow::{anyhow, Context, Result};
use futures::TryStreamExt;
use std::io::{self, Write};

use super::{with_default_temperature, with_spinner};
use crate::output::{print_markdown, Theme};
use claude_kit::prompt_template::{builtin_prompt, prompt_names};
use claude_kit::providers::base::CompletionOptions;
use claude_kit::ClaudeClient;

/// The API's own default
const CHAT_TEMPERATURE: f32 = 1.0;

pub async fn execute(client: &ClaudeClient, options: &CompletionOptions, message: &str) -> Result<()> {
    let options = with_default_temperature(options, CHAT_TEMPERATURE);
    let reply = with_spinner("awaiting reply", client.chat(message, &options))
        .await
        .context("Chat request failed")?;
    print_markdown(&reply, Theme::Dark)
}

/// Print reply fragments as they arrive
pub async fn stream(client: &ClaudeClient, options: &CompletionOptions, message: &str) -> Result<()> {
    let options = with_default_temperature(options, CHAT_TEMPERATURE);
    let mut fragments = client
        .chat_stream(message, &options)
        .await
        .context("Failed to open the response stream")?;

    let mut stdout = io::stdout();
    while let Some(fragment) = fragments.try_next().await? {
        write!(stdout, "{}", fragment)?;
        stdout.flush()?;
    }
    writeln!(stdout)?;
    Ok(())
}

/// Answer `message` with one of the embedded persona system prompts
pub async fn persona(
    client: &ClaudeClient,
    options: &CompletionOptions,
    persona: &str,
    message: &str,
) -> Result<()> {
    let system = persona_prompt(persona)?;
    execute(client, &options.clone().with_system(system), message).await
}

fn persona_prompt(persona: &str) -> Result<String> {
    let available = prompt_names("persona");
    if !available.iter().any(|name| name == persona) {
        return Err(anyhow!(
            "Unknown persona '{}'. Available personas: {}",
            persona,
            available.join(", ")
        ));
    }
    Ok(builtin_prompt(&format!("persona/{}.md", persona))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude_kit::providers::mock::MockProvider;

    #[tokio::test]
    async fn test_chat_and_stream_reply() -> Result<()> {
        let provider = MockProvider::new(vec![
            MockProvider::text("Paris."),
            MockProvider::text("Qubits hold superpositions."),
        ]);
        let client = ClaudeClient::new(Box::new(provider.clone()), CompletionOptions::default());

        execute(&client, client.options(), "What is the capital of France?").await?;
        stream(&client, client.options(), "Explain quantum computing.").await?;
        assert_eq!(provider.request_count(), 2);
        Ok(())
    }

    #[test]
    fn test_chat_temperature_respects_configuration() {
        let options = with_default_temperature(&CompletionOptions::default(), CHAT_TEMPERATURE);
        assert_eq!(options.temperature, Some(1.0));

        let configured = CompletionOptions::default().with_temperature(0.2);
        let options = with_default_temperature(&configured, CHAT_TEMPERATURE);
        assert_eq!(options.temperature, Some(0.2));
    }

    #[test]
    fn test_persona_prompt() -> Result<()> {
        assert!(persona_prompt("pirate")?.contains("pirate"));

        let err = persona_prompt("robot").unwrap_err();
        assert!(err
            .to_string()
            .contains("Available personas: consultant, pirate, summarizer"));
        Ok(())
    }
}
