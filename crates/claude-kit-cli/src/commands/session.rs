use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;

use crate::prompt::rustyline::RustylinePrompt;
use crate::session::Session;
use claude_kit::prompt_template::builtin_prompt;
use claude_kit::providers::base::CompletionOptions;
use claude_kit::ClaudeClient;

pub struct SessionArgs {
    pub max_history: Option<usize>,
    pub system: Option<String>,
    pub persona: Option<String>,
    pub save: Option<PathBuf>,
}

pub async fn execute(
    client: ClaudeClient,
    options: CompletionOptions,
    args: SessionArgs,
) -> Result<()> {
    let options = match (&args.system, &args.persona) {
        (Some(system), _) => options.with_system(system.clone()),
        (None, Some(persona)) => options.with_system(
            builtin_prompt(&format!("persona/{}.md", persona))
                .with_context(|| format!("Unknown persona '{}'", persona))?,
        ),
        (None, None) => options,
    };

    println!(
        "{} {}",
        style("claude-kit session").bold().cyan(),
        style("- type /? for help, /quit to end the session").dim()
    );

    let prompt = RustylinePrompt::new().context("Failed to initialise the line editor")?;
    let mut session =
        Session::new(client, Box::new(prompt), options).with_max_history(args.max_history);
    if let Some(path) = args.save {
        session = session.with_session_file(path)?;
    }
    session.start().await
}
