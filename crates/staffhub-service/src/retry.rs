//! Bounded internal retry for retryable concurrency errors.

use std::time::Duration;

use tracing::warn;

use staffhub_core::config::PolicyConfig;
use staffhub_core::AppResult;

/// How many times to retry and how long to back off between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum retries after the first attempt.
    pub max_retries: u32,
    /// Base backoff; attempt `n` sleeps `n * base`.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Build from the ledger policy configuration.
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

/// Run `op`, retrying on retryable errors with linear backoff.
///
/// Only concurrency errors are retried; validation, policy, and integrity
/// errors surface immediately.
pub async fn with_retries<T, F>(policy: &RetryPolicy, mut op: F) -> AppResult<T>
where
    F: AsyncFnMut() -> AppResult<T>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                warn!(attempt, error = %e, "Retrying after concurrency error");
                tokio::time::sleep(policy.backoff * attempt).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffhub_core::error::ErrorKind;
    use staffhub_core::AppError;

    #[tokio::test(start_paused = true)]
    async fn test_retries_concurrency_until_success() {
        let policy = RetryPolicy::default();
        let mut calls = 0u32;

        let result = with_retries(&policy, async || {
            calls += 1;
            if calls < 3 {
                Err(AppError::concurrency("lock timeout"))
            } else {
                Ok(calls)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let policy = RetryPolicy {
            max_retries: 2,
            backoff: Duration::from_millis(1),
        };
        let mut calls = 0u32;

        let result: AppResult<()> = with_retries(&policy, async || {
            calls += 1;
            Err(AppError::concurrency("still locked"))
        })
        .await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::Concurrency);
        assert_eq!(calls, 3); // initial attempt + 2 retries
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_errors_surface_immediately() {
        let policy = RetryPolicy::default();
        let mut calls = 0u32;

        let result: AppResult<()> = with_retries(&policy, async || {
            calls += 1;
            Err(AppError::policy("insufficient balance"))
        })
        .await;

        assert_eq!(result.unwrap_err().kind, ErrorKind::PolicyViolation);
        assert_eq!(calls, 1);
    }
}
