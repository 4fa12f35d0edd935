//! Retrying model calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};
use crate::llms::LlmError;

/// Retry configuration.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure, in milliseconds.
    pub initial_delay_ms: u64,
    /// Growth factor applied to the delay after each failure.
    pub backoff_multiplier: f64,
    /// Whether to randomize delays by up to ±50%.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Constant delay between attempts.
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay_secs: u64) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: delay_secs * 1000,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap
    )]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let mut ms = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        if self.jitter {
            ms *= 0.5 + fastrand::f64();
        }
        Duration::from_millis(ms.max(0.0) as u64)
    }
}

/// Whether another attempt could change the outcome.
///
/// Credentials and local template failures are permanent; anything coming
/// back from the model service is worth another try.
#[must_use]
pub const fn should_retry(err: &Error) -> bool {
    !matches!(
        err,
        Error::Llm(LlmError::Auth { .. }) | Error::Prompt(_) | Error::Config(_)
    )
}

/// Run `op` until it succeeds, fails permanently, or attempts run out.
///
/// The error of the last attempt is returned.
///
/// # Errors
///
/// Propagates the final error from `op`.
pub async fn retry<T, F, Fut>(config: &RetryConfig, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts && should_retry(&err) => {
                let delay = config.delay_for(attempt);
                warn!(
                    label,
                    attempt,
                    max_attempts = attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
