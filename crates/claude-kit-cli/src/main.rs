use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use claude_kit::providers::base::CompletionOptions;
use claude_kit::ClaudeClient;

mod commands;
mod demo_tools;
mod output;
mod prompt;
mod samples;
mod session;

use commands::email::{EmailKind, EmailRequest};
use commands::extract::Extraction;
use commands::session::SessionArgs;
use commands::summarize::SummaryStyle;
use demo_tools::ToolDemo;

#[derive(Parser)]
#[command(author, version, about = "Claude API usage demos", long_about = None)]
struct Cli {
    /// Model to use (defaults to ANTHROPIC_MODEL or claude-sonnet-4-20250514)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Maximum tokens in each reply
    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Sampling temperature between 0.0 and 1.0
    #[arg(short, long, global = true)]
    temperature: Option<f32>,

    /// Log requests, retries and token usage
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a single message and print the reply
    Chat {
        #[arg(default_value = "What is the capital of France?")]
        message: String,
    },

    /// Stream a reply as it is generated
    Stream {
        #[arg(default_value = "Explain quantum computing in simple terms.")]
        message: String,
    },

    /// Answer with a persona system prompt
    Persona {
        /// One of: consultant, pirate, summarizer
        #[arg(short, long, default_value = "pirate")]
        persona: String,

        #[arg(default_value = "Tell me about the ocean.")]
        message: String,
    },

    /// Extract product details as typed JSON
    Structured {
        /// Product description file (defaults to stdin or a built-in sample)
        file: Option<PathBuf>,
    },

    /// Review source code
    Review {
        /// Source file (defaults to stdin or a built-in sample)
        file: Option<PathBuf>,

        /// Fence language, inferred from the file extension when omitted
        #[arg(short, long)]
        language: Option<String>,

        /// Security audit instead of a general review
        #[arg(long)]
        audit: bool,
    },

    /// Draft an email
    Email {
        #[arg(value_enum, default_value = "outreach")]
        kind: EmailKind,

        /// Context for the email (defaults to a built-in example)
        details: Option<String>,

        #[arg(long)]
        recipient: Option<String>,

        #[arg(long)]
        sender: Option<String>,

        #[arg(long, default_value_t = 150)]
        max_words: usize,
    },

    /// Summarize an article
    Summarize {
        /// Article file (defaults to stdin or a built-in sample)
        file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "brief")]
        style: SummaryStyle,
    },

    /// Extract contacts, financial metrics or events as JSON
    Extract {
        #[arg(value_enum)]
        kind: Extraction,

        /// Input file (defaults to stdin or a built-in sample)
        file: Option<PathBuf>,
    },

    /// Start an interactive multi-turn chat
    Session {
        /// Keep at most this many messages of history
        #[arg(long)]
        max_history: Option<usize>,

        /// System prompt for the whole session
        #[arg(long, conflicts_with = "persona")]
        system: Option<String>,

        /// Use a persona system prompt
        #[arg(short, long)]
        persona: Option<String>,

        /// Record the conversation to this file, resuming it if present
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Let the model call local tools
    Tools {
        #[arg(value_enum)]
        demo: ToolDemo,

        /// Question to ask (defaults to one suited to the demo)
        question: Option<String>,
    },
}

impl Cli {
    /// The configured defaults with any command line overrides applied
    fn options(&self, defaults: &CompletionOptions) -> CompletionOptions {
        let mut options = defaults.clone();
        if let Some(model) = &self.model {
            options.model = model.clone();
        }
        if let Some(max_tokens) = self.max_tokens {
            options.max_tokens = max_tokens;
        }
        if let Some(temperature) = self.temperature {
            options.temperature = Some(temperature);
        }
        options
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("claude_kit={}", level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let client = ClaudeClient::from_env().context("Failed to configure the Claude client")?;
    let options = cli.options(client.options());

    match cli.command {
        Command::Chat { message } => commands::chat::execute(&client, &options, &message).await,
        Command::Stream { message } => commands::chat::stream(&client, &options, &message).await,
        Command::Persona { persona, message } => {
            commands::chat::persona(&client, &options, &persona, &message).await
        }
        Command::Structured { file } => {
            let text = samples::read_input(file.as_deref(), samples::PRODUCT)?;
            commands::structured::execute(&client, &options, &text).await
        }
        Command::Review {
            file,
            language,
            audit,
        } => commands::review::execute(&client, &options, file.as_deref(), language, audit).await,
        Command::Email {
            kind,
            details,
            recipient,
            sender,
            max_words,
        } => {
            let request = EmailRequest {
                kind,
                recipient,
                sender,
                details,
                max_words,
            };
            commands::email::execute(&client, &options, &request).await
        }
        Command::Summarize { file, style } => {
            commands::summarize::execute(&client, &options, file.as_deref(), style).await
        }
        Command::Extract { kind, file } => {
            commands::extract::execute(&client, &options, kind, file.as_deref()).await
        }
        Command::Session {
            max_history,
            system,
            persona,
            save,
        } => {
            let args = SessionArgs {
                max_history,
                system,
                persona,
                save,
            };
            commands::session::execute(client, options, args).await
        }
        Command::Tools { demo, question } => {
            commands::tools::execute(client, options, demo, question).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from([
            "claude-kit",
            "chat",
            "Hi",
            "--model",
            "claude-3-5-haiku-latest",
            "--temperature",
            "0.5",
        ]);
        let options = cli.options(&CompletionOptions::default().with_max_tokens(1024));
        assert_eq!(options.model, "claude-3-5-haiku-latest");
        assert_eq!(options.temperature, Some(0.5));
        assert_eq!(options.max_tokens, 1024);
    }

    #[test]
    fn test_session_flags_conflict() {
        let result = Cli::try_parse_from([
            "claude-kit",
            "session",
            "--system",
            "Be brief.",
            "--persona",
            "pirate",
        ]);
        assert!(result.is_err());
    }
}
