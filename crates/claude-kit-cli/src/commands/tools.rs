use anyhow::{Context, Result};
use console::style;

use super::with_spinner;
use crate::demo_tools::ToolDemo;
use crate::output::{print_message, Theme};
use claude_kit::models::message::Message;
use claude_kit::providers::base::CompletionOptions;
use claude_kit::{ClaudeClient, Conversation};

const MAX_TURNS: usize = 10;

/// Answer `question` through the tool loop and print every exchanged message
pub async fn execute(
    client: ClaudeClient,
    options: CompletionOptions,
    demo: ToolDemo,
    question: Option<String>,
) -> Result<()> {
    let question = question.unwrap_or_else(|| demo.default_question().to_string());
    let agent = client
        .into_agent(demo.toolbox())
        .with_options(options)
        .with_max_turns(MAX_TURNS);

    let mut conversation = Conversation::new();
    conversation.push(Message::user().with_text(&question));
    println!("{} {}", style("You:").bold(), question);

    with_spinner("thinking", agent.reply(&mut conversation))
        .await
        .context("Tool loop failed")?;

    for message in conversation.messages().iter().skip(1) {
        print_message(message, Theme::Dark)?;
    }
    Ok(())
}
