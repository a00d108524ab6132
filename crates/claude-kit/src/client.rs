use tracing::{debug, error};

use crate::agent::Agent;
use crate::configuration::Settings;
use crate::conversation::Conversation;
use crate::errors::{AgentError, Result};
use crate::models::message::Message;
use crate::providers::anthropic::AnthropicProvider;
use crate::providers::base::{Completion, CompletionOptions, Provider, TextStream};
use crate::retry::{with_retry, RetryConfig};
use crate::toolbox::Toolbox;

/// Convenience wrapper for the common request shapes
///
/// Every call goes through [`with_retry`]. Options are passed per call; [`Self::options`]
/// holds the configured defaults to start from.
pub struct ClaudeClient {
    provider: Box<dyn Provider>,
    options: CompletionOptions,
    retry: RetryConfig,
}

impl ClaudeClient {
    pub fn new(provider: Box<dyn Provider>, options: CompletionOptions) -> Self {
        Self {
            provider,
            options,
            retry: RetryConfig::default(),
        }
    }

    /// Build an Anthropic-backed client from `ANTHROPIC_*` environment variables
    pub fn from_env() -> Result<Self> {
        let settings = Settings::new().inspect_err(|e| error!("{}", e))?;
        Self::from_settings(&settings)
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        debug!("Creating client from {:?}", settings);
        let provider = AnthropicProvider::new(settings.provider_config())?;
        Ok(Self::new(Box::new(provider), settings.completion_options())
            .with_retry(settings.retry.clone()))
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// The configured defaults
    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Hand the provider and settings to a tool-calling [`Agent`]
    pub fn into_agent(self, toolbox: Toolbox) -> Agent {
        Agent::new(self.provider, toolbox)
            .with_options(self.options)
            .with_retry(self.retry)
    }

    /// Send a single user message and return the reply text
    pub async fn chat(&self, message: &str, options: &CompletionOptions) -> Result<String> {
        let messages = [Message::user().with_text(message)];
        let completion = self.complete(&messages, options).await?;
        reply_text(&completion)
    }

    /// Send a single user message and stream the reply text
    ///
    /// Only opening the stream is retried; an error part way through ends the stream.
    pub async fn chat_stream(
        &self,
        message: &str,
        options: &CompletionOptions,
    ) -> Result<TextStream> {
        let messages = [Message::user().with_text(message)];
        let stream = with_retry(&self.retry, || self.provider.stream(options, &messages)).await?;
        Ok(stream)
    }

    /// Append `message` to the conversation, then the model's reply
    ///
    /// The conversation is left unchanged when the call fails.
    pub async fn multi_turn_chat(
        &self,
        conversation: &mut Conversation,
        message: &str,
        options: &CompletionOptions,
    ) -> Result<String> {
        conversation.push(Message::user().with_text(message));

        let result = self
            .complete(conversation.messages(), options)
            .await
            .and_then(|completion| Ok((reply_text(&completion)?, completion.message)));

        match result {
            Ok((text, reply)) => {
                conversation.push(reply);
                Ok(text)
            }
            Err(e) => {
                conversation.pop();
                Err(e)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<Completion> {
        let completion = with_retry(&self.retry, || self.provider.complete(options, messages)).await?;
        debug!(
            "Completion finished with {:?}, usage {:?}",
            completion.stop_reason, completion.usage
        );
        Ok(completion)
    }
}

fn reply_text(completion: &Completion) -> Result<String> {
    completion.message.text().ok_or_else(|| {
        error!(
            "Reply with stop reason {:?} contained no text",
            completion.stop_reason
        );
        AgentError::EmptyResponse.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, ProviderError};
    use crate::models::tool::ToolCall;
    use crate::providers::base::{StopReason, Usage};
    use crate::providers::mock::MockProvider;
    use futures::TryStreamExt;
    use serde_json::json;
    use std::time::Duration;

    fn client(provider: &MockProvider) -> ClaudeClient {
        ClaudeClient::new(Box::new(provider.clone()), CompletionOptions::default())
    }

    #[tokio::test]
    async fn test_chat_returns_text() -> Result<()> {
        let provider = MockProvider::new(vec![MockProvider::text("Paris.")]);
        let client = client(&provider);

        let reply = client
            .chat("What is the capital of France?", client.options())
            .await?;

        assert_eq!(reply, "Paris.");
        assert_eq!(
            provider.requests(),
            vec![vec![Message::user().with_text("What is the capital of France?")]]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_without_text_is_empty_response() {
        let provider = MockProvider::new(vec![Completion {
            message: Message::assistant()
                .with_tool_request("toolu_1", ToolCall::new("get_weather", json!({}))),
            stop_reason: StopReason::ToolUse,
            usage: Usage::default(),
        }]);
        let err = client(&provider)
            .chat("Hi", &CompletionOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Agent(AgentError::EmptyResponse)));
    }

    #[tokio::test]
    async fn test_chat_rejects_invalid_options() {
        let provider = MockProvider::new(vec![MockProvider::text("unreachable")]);
        let options = CompletionOptions::default().with_temperature(1.2);
        let err = client(&provider).chat("Hi", &options).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(ProviderError::InvalidRequest(_))
        ));
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_stream_yields_fragments() -> Result<()> {
        let provider = MockProvider::new(vec![MockProvider::text("Once upon a time")]);
        let stream = client(&provider)
            .chat_stream("Tell me a story", &CompletionOptions::default())
            .await?;
        let fragments: Vec<String> = stream.try_collect().await?;
        assert_eq!(fragments, vec!["Once ", "upon ", "a ", "time"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_multi_turn_chat_grows_conversation() -> Result<()> {
        let provider = MockProvider::new(vec![
            MockProvider::text("Nice to meet you, Sam."),
            MockProvider::text("Your name is Sam."),
        ]);
        let client = client(&provider);
        let mut conversation = Conversation::new();

        client
            .multi_turn_chat(&mut conversation, "My name is Sam.", client.options())
            .await?;
        let reply = client
            .multi_turn_chat(&mut conversation, "What is my name?", client.options())
            .await?;

        assert_eq!(reply, "Your name is Sam.");
        assert_eq!(conversation.len(), 4);
        // The second call saw the first exchange
        assert_eq!(provider.requests()[1].len(), 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_multi_turn_chat_failure_leaves_conversation() {
        let provider = MockProvider::with_results(vec![
            Err(ProviderError::Connection("reset".to_string())),
            Err(ProviderError::Connection("reset".to_string())),
        ]);
        let client = client(&provider).with_retry(RetryConfig::new(
            1,
            Duration::from_millis(100),
            2.0,
        ));
        let mut conversation = Conversation::new();

        let err = client
            .multi_turn_chat(&mut conversation, "Hello?", &CompletionOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Provider(ProviderError::Connection(_))));
        assert_eq!(provider.request_count(), 2);
        assert!(conversation.is_empty());
    }
}
