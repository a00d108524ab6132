use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failures raised locally while orchestrating a conversation
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Malformed JSON in model output: {message}")]
    MalformedJson { message: String, raw: String },

    #[error("Response contained no text content")]
    EmptyResponse,

    #[error("Conversation exceeded {0} model turns")]
    TurnLimit(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AgentResult<T> = std::result::Result<T, AgentError>;

/// Failures raised by the remote API or the transport in front of it
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Stream error: {0}")]
    Stream(String),
}

impl ProviderError {
    /// Map a non-success HTTP status and its body onto the error taxonomy
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(body);
        match status {
            StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ProviderError::Authentication(message)
            }
            // 529 is the API's "overloaded" status and falls in the 5xx range
            status if status == StatusCode::REQUEST_TIMEOUT || status.is_server_error() => {
                ProviderError::Server {
                    status: status.as_u16(),
                    message,
                }
            }
            status => ProviderError::InvalidRequest(format!("{} - {}", status, message)),
        }
    }
}

/// Pull `error.message` out of an API error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::from_status(status, &err.to_string())
        } else {
            ProviderError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Convert a configuration key such as `retry.max_retries` into its environment variable
pub fn to_env_var(field: &str) -> String {
    format!("ANTHROPIC_{}", field.to_uppercase().replace('.', "__"))
}

/// Everything the library can fail with, one variant per category
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

pub type Result<T> = std::result::Result<T, Error>;
