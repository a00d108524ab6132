use async_trait::async_trait;
use futures::stream;
use serde_json::Value;
use std::sync::Arc;
use std::sync::Mutex;

use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::models::tool::ToolCall;
use crate::providers::base::{
    Completion, CompletionOptions, Provider, StopReason, TextStream, Usage,
};

/// A mock provider that returns pre-configured responses for testing
///
/// Responses are handed out in order. Each scripted entry is either a completion or a
/// provider error, so retry behavior can be exercised without a server.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<Result<Completion, ProviderError>>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Completion>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    /// Create a mock provider whose script may include failures
    pub fn with_results(responses: Vec<Result<Completion, ProviderError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A plain `end_turn` reply
    pub fn text<S: Into<String>>(text: S) -> Completion {
        Completion {
            message: Message::assistant().with_text(text),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        }
    }

    /// A `tool_use` reply requesting each `(id, name, arguments)` in order
    pub fn tool_use<'a, I>(calls: I) -> Completion
    where
        I: IntoIterator<Item = (&'a str, &'a str, Value)>,
    {
        let message = calls
            .into_iter()
            .fold(Message::assistant(), |message, (id, name, arguments)| {
                message.with_tool_request(id, ToolCall::new(name, arguments))
            });
        Completion {
            message,
            stop_reason: StopReason::ToolUse,
            usage: Usage::default(),
        }
    }

    /// Number of calls made so far, streamed or not
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// The transcript sent with each call, oldest first
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_response(&self, messages: &[Message]) -> Result<Completion, ProviderError> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|e| ProviderError::Connection(e.to_string()))?;
        requests.push(messages.to_vec());

        let mut responses = self
            .responses
            .lock()
            .map_err(|e| ProviderError::Connection(e.to_string()))?;
        if responses.is_empty() {
            return Err(ProviderError::InvalidRequest(
                "mock provider has no responses left".to_string(),
            ));
        }
        responses.remove(0)
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        options: &CompletionOptions,
        messages: &[Message],
    ) -> Result<Completion, ProviderError> {
        options.validate()?;
        self.next_response(messages)
    }

    async fn stream(
        &self,
        options: &CompletionOptions,
        messages: &[Message],
    ) -> Result<TextStream, ProviderError> {
        options.validate()?;
        let text = self.next_response(messages)?.message.text().unwrap_or_default();
        let fragments: Vec<Result<String, ProviderError>> = text
            .split_inclusive(' ')
            .map(|fragment| Ok(fragment.to_string()))
            .collect();
        Ok(Box::pin(stream::iter(fragments)))
    }
}
