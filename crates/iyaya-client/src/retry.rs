//! Exponential-backoff retry policy for read operations.
//!
//! The policy retries only failures the error taxonomy marks retryable
//! (network, timeout, server, unknown). Auth and validation failures abort
//! on the first attempt: retrying with a stale token or an invalid payload
//! cannot succeed, and the 401 path is handled separately by the dispatcher.
//!
//! The policy does not make the wrapped operation idempotent. Mutating
//! "create" calls therefore use [`RetryPolicy::none`] so a transient failure
//! never produces duplicate records.

use std::time::Duration;

use iyaya_core::Result;
#[cfg(test)]
use iyaya_core::ServiceError;
use iyaya_config::RetryConfig;
use rand::Rng;

/// Bounded retry policy used by the resource façades.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// Builds a policy from configuration.
    #[must_use]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: config.base_delay,
            max_delay: config.max_delay,
            jitter: config.jitter,
        }
    }

    /// A policy that never retries. Used for mutating create calls.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Number of retries after the initial attempt.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `op`, retrying retryable failures with capped exponential
    /// backoff.
    ///
    /// The operation runs once plus up to `max_attempts` retries. The last
    /// classified error is returned when attempts are exhausted.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable error immediately, or the final
    /// error after exhausting all attempts.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => {
                    tracing::debug!(kind = %err.kind(), "not retryable, aborting");
                    return Err(err);
                }
                Err(err) if attempt >= self.max_attempts => {
                    tracing::warn!(
                        kind = %err.kind(),
                        attempts = attempt + 1,
                        "retries exhausted"
                    );
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.delay_for(attempt);
                    tracing::debug!(
                        kind = %err.kind(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Backoff delay for the given zero-based attempt:
    /// `base * 2^attempt + jitter`, capped at `max_delay`.
    fn delay_for(&self, attempt: u32) -> Duration {
        let pow = 2u32.saturating_pow(attempt);
        let mut millis = self
            .base_delay
            .as_millis()
            .saturating_mul(u128::from(pow))
            .min(self.max_delay.as_millis()) as u64;
        if self.jitter && millis > 0 {
            let spread = millis / 2;
            millis += rand::thread_rng().gen_range(0..=spread);
        }
        Duration::from_millis(millis.min(self.max_delay.as_millis() as u64))
    }
}
