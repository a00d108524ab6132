use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use super::base::{Completion, CompletionOptions, Provider, TextStream};
use super::configs::{AnthropicProviderConfig, ANTHROPIC_API_VERSION};
use super::streaming::text_stream;
use super::utils::{anthropic_response_to_completion, create_request};
use crate::errors::ProviderError;
use crate::models::message::Message;

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()
            .map_err(|e| ProviderError::Connection(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: &Value) -> Result<Response, ProviderError> {
        let url = self.config.messages_url();
        debug!("POST {} model={}", url, payload["model"]);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let err = ProviderError::from_status(status, &body);
        error!("Anthropic API returned {}: {}", status, err);
        Err(err)
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        options: &CompletionOptions,
        messages: &[Message],
    ) -> Result<Completion, ProviderError> {
        let payload = create_request(options, messages, false)?;
        let response: Value = self.post(&payload).await?.json().await?;
        let completion = anthropic_response_to_completion(response)?;
        debug!(
            "Completion stop_reason={:?} input_tokens={:?} output_tokens={:?}",
            completion.stop_reason, completion.usage.input_tokens, completion.usage.output_tokens
        );
        Ok(completion)
    }

    async fn stream(
        &self,
        options: &CompletionOptions,
        messages: &[Message],
    ) -> Result<TextStream, ProviderError> {
        let payload = create_request(options, messages, true)?;
        let response = self.post(&payload).await?;
        Ok(text_stream(response.bytes_stream()))
    }
}
