//! Retry with exponential backoff
//!
//! Wraps a single outbound call. Transient failures (rate limiting, connection trouble,
//! overloaded servers) are retried after `initial_delay * backoff_factor^attempt`;
//! everything else is returned on the first attempt. There is no jitter and no delay cap.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::errors::{Error, ProviderError};

/// Classifies an error as worth retrying or not
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for ProviderError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited(_)
                | ProviderError::Connection(_)
                | ProviderError::Server { .. }
        )
    }
}

impl Transient for Error {
    fn is_transient(&self) -> bool {
        match self {
            Error::Provider(e) => e.is_transient(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Additional attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry
    #[serde(rename = "initial_delay_secs", deserialize_with = "secs_f64")]
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            initial_delay,
            backoff_factor,
        }
    }

    /// A single attempt, no retries
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay to wait after the given (zero-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let secs = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        // The schedule is unbounded; saturate rather than panic once it leaves Duration's range
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

fn secs_f64<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let secs = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
}

/// Run `operation`, retrying transient failures according to `config`.
///
/// Makes at most `max_retries + 1` attempts. On exhaustion the last transient error is
/// returned; a non-transient error is returned immediately without sleeping.
pub async fn with_retry<T, E, F, Fut>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!("Succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => {
                error!("Request failed with non-retryable error: {}", e);
                return Err(e);
            }
            Err(e) if attempt >= config.max_retries => {
                error!("Failed after {} retries: {}", config.max_retries, e);
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for(attempt);
                warn!(
                    "Attempt {} failed: {}. Retrying in {:.1}s",
                    attempt + 1,
                    e,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
