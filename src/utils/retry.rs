use anyhow::{Error, Result, anyhow};
use std::{future::Future, time::Duration};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::models::common::RetrySettings;
use crate::utils::strip_html;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub exponential: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetrySettings::default().into()
    }
}

impl From<RetrySettings> for RetryConfig {
    fn from(settings: RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            base_delay_ms: settings.base_delay_ms,
            max_delay_ms: settings.max_delay_ms,
            exponential: 2.0,
        }
    }
}

/// Retries `operation` with exponential backoff until it succeeds or `config.max_attempts`
/// is reached.
pub async fn retry<F, Fut, T>(operation: F, config: &RetryConfig, context: &str) -> Result<T, Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, Error>>,
{
    retry_if(operation, config, context, |_| true).await
}

/// Like [`retry`], but stops at the first error `is_transient` rejects and returns that
/// error untouched, so callers can still downcast it.
pub async fn retry_if<F, Fut, T, P>(
    operation: F,
    config: &RetryConfig,
    context: &str,
    is_transient: P,
) -> Result<T, Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<T, Error>>,
    P: Fn(&Error) -> bool,
{
    let mut attempt = 1;
    let mut delay = config.base_delay_ms;

    loop {
        let e = match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => e,
        };

        if !is_transient(&e) {
            debug!("Operation '{}' failed permanently: {}", context, e);
            return Err(e);
        }

        let message = strip_html(&e.to_string());
        if attempt >= config.max_attempts {
            error!(
                "Operation '{}' failed after {} attempts. Final error: {}",
                context, attempt, message
            );
            return Err(anyhow!(message).context(format!("Failed after {} attempts", attempt)));
        }

        warn!(
            "Attempt {}/{} for '{}' failed: {}. Retrying in {}ms...",
            attempt, config.max_attempts, context, message, delay
        );
        sleep(Duration::from_millis(delay)).await;

        delay = next_delay(delay, config);
        attempt += 1;
    }
}

// Exponential backoff with full jitter
// https://aws.amazon.com/blogs/architecture/exponential-backoff-and-jitter/
fn next_delay(delay: u64, config: &RetryConfig) -> u64 {
    let ceiling = delay.max(1) as f64 * config.exponential;
    std::cmp::min(config.max_delay_ms, (fastrand::f64() * ceiling) as u64)
}
