use config::{Config, Environment};
use serde::Deserialize;
use std::fmt;

use crate::errors::{to_env_var, ConfigError};
use crate::providers::base::{CompletionOptions, DEFAULT_MAX_TOKENS, DEFAULT_MODEL};
use crate::providers::configs::{AnthropicProviderConfig, ANTHROPIC_HOST};
use crate::retry::RetryConfig;

/// Settings read from `ANTHROPIC_*` environment variables
///
/// Nested keys use a double underscore, e.g. `ANTHROPIC_RETRY__MAX_RETRIES`.
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub api_key: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("retry", &self.retry)
            .finish()
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_and_validate()
    }

    fn load_and_validate() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("host", default_host())?
            .set_default("model", default_model())?
            .set_default("max_tokens", default_max_tokens())?
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix("ANTHROPIC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let result: Result<Self, config::ConfigError> = config.try_deserialize();

        let settings = match result {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!("Configuration error: {:?}", &err);

                // Handle both NotFound and missing field message variants
                let error_str = err.to_string();
                return if error_str.starts_with("missing field") {
                    // Extract field name from error message "missing field `api_key`"
                    let field = error_str
                        .trim_start_matches("missing field `")
                        .trim_end_matches('`');
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else if let config::ConfigError::NotFound(field) = &err {
                    Err(ConfigError::MissingEnvVar {
                        env_var: to_env_var(field),
                    })
                } else {
                    Err(ConfigError::Other(err))
                };
            }
        };

        if settings.api_key.trim().is_empty() {
            return Err(ConfigError::MissingEnvVar {
                env_var: to_env_var("api_key"),
            });
        }
        Ok(settings)
    }

    pub fn provider_config(&self) -> AnthropicProviderConfig {
        AnthropicProviderConfig::new(self.api_key.clone()).with_host(self.host.clone())
    }

    /// Request options seeded from the configured model, token limit and temperature
    pub fn completion_options(&self) -> CompletionOptions {
        let options = CompletionOptions::new(self.model.clone()).with_max_tokens(self.max_tokens);
        match self.temperature {
            Some(temperature) => options.with_temperature(temperature),
            None => options,
        }
    }
}

fn default_host() -> String {
    ANTHROPIC_HOST.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
