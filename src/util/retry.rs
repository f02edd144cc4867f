//! Retry with exponential backoff and jitter.
//!
//! Only idempotent requests go through a policy; creating requests are sent
//! once and their errors propagate unchanged.

use std::future::Future;
use std::time::Duration;

use crate::error::FoundryError;

/// Retry policy configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Execute an async operation with retry.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, FoundryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FoundryError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            if !error.is_retryable() || attempt >= attempts {
                return Err(error);
            }

            let delay = match &error {
                FoundryError::RateLimited {
                    retry_after_ms: Some(ms),
                } => Duration::from_millis(*ms).min(self.max_backoff),
                _ => jittered(backoff),
            };

            tracing::warn!(
                attempt,
                max_attempts = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying after error"
            );

            tokio::time::sleep(delay).await;
            backoff = Duration::from_secs_f64(
                (backoff.as_secs_f64() * self.multiplier).min(self.max_backoff.as_secs_f64()),
            );
        }
    }
}

// 75%..125% of the base delay.
fn jittered(base: Duration) -> Duration {
    let factor = 0.75 + (uuid::Uuid::new_v4().as_u128() % 10_000) as f64 / 20_000.0;
    Duration::from_secs_f64(base.as_secs_f64() * factor)
}
