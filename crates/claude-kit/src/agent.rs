use tracing::{debug, error, info, warn};

use crate::conversation::Conversation;
use crate::errors::{AgentError, Result};
use crate::models::message::{Message, ToolRequest};
use crate::providers::base::{CompletionOptions, Provider, StopReason};
use crate::retry::{with_retry, RetryConfig};
use crate::toolbox::Toolbox;

/// Agent drives a conversation through as many tool calls as the model asks for
///
/// Each round sends the whole transcript. When the model stops for `tool_use`, every
/// requested tool runs in the order the model listed them and the assistant turn plus a
/// single user turn of results are appended before the next call. Any other stop reason
/// ends the reply.
pub struct Agent {
    provider: Box<dyn Provider>,
    toolbox: Toolbox,
    options: CompletionOptions,
    retry: RetryConfig,
    max_turns: Option<usize>,
}

impl Agent {
    /// Create a new Agent with the specified provider and tools
    pub fn new(provider: Box<dyn Provider>, toolbox: Toolbox) -> Self {
        Self {
            provider,
            toolbox,
            options: CompletionOptions::default(),
            retry: RetryConfig::default(),
            max_turns: None,
        }
    }

    /// Options for every call. Any tools already set are replaced by the toolbox's.
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fail with [`AgentError::TurnLimit`] instead of making more than `max_turns` model calls
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    pub fn toolbox(&self) -> &Toolbox {
        &self.toolbox
    }

    fn request_options(&self) -> CompletionOptions {
        self.options.clone().with_tools(self.toolbox.tools().to_vec())
    }

    /// Run the tool loop on `conversation` and return the final reply text
    ///
    /// On success the conversation ends with the final assistant message. On error the
    /// round in progress is not appended, so the transcript never holds a tool request
    /// without its result.
    pub async fn reply(&self, conversation: &mut Conversation) -> Result<String> {
        let options = self.request_options();
        let mut turns = 0;

        loop {
            if let Some(max_turns) = self.max_turns {
                if turns >= max_turns {
                    error!("Giving up after {} model turns", max_turns);
                    return Err(AgentError::TurnLimit(max_turns).into());
                }
            }
            turns += 1;

            let completion = with_retry(&self.retry, || {
                self.provider.complete(&options, conversation.messages())
            })
            .await?;
            debug!(
                "Turn {} finished with {:?}, {:?} tokens",
                turns,
                completion.stop_reason,
                completion.usage.total_tokens()
            );

            if completion.stop_reason != StopReason::ToolUse {
                if completion.stop_reason == StopReason::MaxTokens {
                    warn!("Reply was cut off at max_tokens={}", options.max_tokens);
                }
                let mut message = completion.message;
                if message.has_tool_requests() {
                    // A tool request without its result cannot be sent back to the model
                    warn!(
                        "Dropping tool requests from a reply that stopped with {:?}",
                        completion.stop_reason
                    );
                    message
                        .content
                        .retain(|content| content.as_tool_request().is_none());
                }
                let Some(text) = message.text() else {
                    error!("Final reply contained no text");
                    return Err(AgentError::EmptyResponse.into());
                };
                conversation.push(message);
                return Ok(text);
            }

            let results = self.dispatch(&completion.message).await?;
            conversation.push(completion.message);
            conversation.push(results);
        }
    }

    /// Run every tool the message requests, resolving all names before running any
    async fn dispatch(&self, message: &Message) -> Result<Message> {
        let requests: Vec<&ToolRequest> = message.tool_requests().collect();
        if requests.is_empty() {
            error!("Model stopped for tool_use without requesting a tool");
            return Err(
                AgentError::Internal("tool_use response without tool requests".to_string()).into(),
            );
        }

        if let Some(unknown) = requests
            .iter()
            .find(|request| !self.toolbox.contains(&request.tool_call.name))
        {
            error!("Model requested unknown tool {}", unknown.tool_call.name);
            return Err(AgentError::ToolNotFound(unknown.tool_call.name.clone()).into());
        }

        let mut results = Message::user();
        for request in requests {
            info!(
                "Using tool {}({})",
                request.tool_call.name, request.tool_call.arguments
            );
            let output = self.toolbox.call(&request.tool_call).await?;
            debug!("Tool {} returned {}", request.id, output);
            results = results.with_tool_response(request.id.clone(), output);
        }
        Ok(results)
    }
}
