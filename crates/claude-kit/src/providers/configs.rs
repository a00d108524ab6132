use serde::Deserialize;

pub const ANTHROPIC_HOST: &str = "https://api.anthropic.com";
pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnthropicProviderConfig {
    pub host: String,
    pub api_key: String,
}

impl AnthropicProviderConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            host: ANTHROPIC_HOST.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.host.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_url_trims_trailing_slash() {
        let config = AnthropicProviderConfig::new("key").with_host("http://localhost:8080/");
        assert_eq!(config.messages_url(), "http://localhost:8080/v1/messages");
        assert_eq!(
            AnthropicProviderConfig::new("key").messages_url(),
            "https://api.anthropic.com/v1/messages"
        );
    }
}
