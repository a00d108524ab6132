use anyhow::Result;
use std::path::PathBuf;
use tracing::debug;

use crate::prompt::{InputType, Prompt};
use claude_kit::models::message::Message;
use claude_kit::providers::base::CompletionOptions;
use claude_kit::{ClaudeClient, Conversation};

pub mod session_file;

use session_file::{load_messages, persist_messages};

/// Interactive multi-turn chat with an optional history bound and transcript file
pub struct Session<'a> {
    client: ClaudeClient,
    prompt: Box<dyn Prompt + 'a>,
    options: CompletionOptions,
    conversation: Conversation,
    max_history: Option<usize>,
    session_file: Option<PathBuf>,
}

impl<'a> Session<'a> {
    pub fn new(client: ClaudeClient, prompt: Box<dyn Prompt + 'a>, options: CompletionOptions) -> Self {
        Session {
            client,
            prompt,
            options,
            conversation: Conversation::new(),
            max_history: None,
            session_file: None,
        }
    }

    /// Keep at most this many messages between turns
    pub fn with_max_history(mut self, max_history: Option<usize>) -> Self {
        self.max_history = max_history;
        self
    }

    /// Record to `session_file`, resuming the transcript already in it
    pub fn with_session_file(mut self, session_file: PathBuf) -> Result<Self> {
        self.conversation = Conversation::from(load_messages(&session_file)?);
        self.session_file = Some(session_file);
        Ok(self)
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub async fn start(&mut self) -> Result<()> {
        self.setup_session();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        self.process_message(content).await?;
                    }
                }
                InputType::Clear => {
                    self.conversation.clear();
                    self.persist()?;
                    self.prompt
                        .render(&raw_message("Conversation cleared. Starting fresh!"));
                }
                InputType::Exit => break,
                InputType::AskAgain | InputType::ToggleTheme | InputType::Help => continue,
            }
        }

        self.close_session();
        Ok(())
    }

    async fn process_message(&mut self, content: &str) -> Result<()> {
        self.prompt.show_busy();
        let outcome = tokio::select! {
            result = self.client.multi_turn_chat(&mut self.conversation, content, &self.options) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };
        self.prompt.hide_busy();

        match outcome {
            Some(Ok(_)) => {
                if let Some(reply) = self.conversation.last() {
                    self.prompt.render(reply);
                }
            }
            Some(Err(e)) => self.prompt.render_error(&e.to_string()),
            None => {
                // Resets the interaction to before the interrupted user request
                if self.conversation.last().is_some_and(|m| m.is_user_text()) {
                    self.conversation.pop();
                }
                self.prompt.render(&raw_message(
                    "Interrupt: Resetting conversation to before the last sent message...",
                ));
            }
        }

        if let Some(max_history) = self.max_history {
            let dropped = self.conversation.truncate_to(max_history);
            if dropped > 0 {
                debug!("Trimmed {} messages from session history", dropped);
            }
        }
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        match &self.session_file {
            Some(path) => persist_messages(path, self.conversation.messages()),
            None => Ok(()),
        }
    }

    fn setup_session(&mut self) {
        if let Some(path) = &self.session_file {
            let notice = format!(
                "Starting session with {} messages. Recording to {}",
                self.conversation.len(),
                path.display()
            );
            self.prompt.render(&raw_message(&notice));
        }
        self.prompt.ready();
    }

    fn close_session(&mut self) {
        if let Some(path) = &self.session_file {
            let notice = format!("Closing session. Recorded to {}", path.display());
            self.prompt.render(&raw_message(&notice));
        }
        self.prompt.close();
    }
}

fn raw_message(content: &str) -> Message {
    Message::assistant().with_text(content)
}
