//! Retry policy with linear backoff
//!
//! Used where a Graph write is known to race the directory's replication,
//! e.g. removing a password credential right after another one was added.

use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;

/// Configuration for retry behavior. Delays grow linearly: base, 2*base, ...
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Three attempts, waiting 1s then 2s between them
    pub fn secret_cleanup() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `operation` until it succeeds, `should_retry` rejects the error,
    /// or the attempts run out. The closure receives the 1-based attempt.
    pub async fn execute<F, Fut, T, E, P>(&self, should_retry: P, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!("Executing operation (attempt {}/{})", attempt, max_attempts);

            match operation(attempt).await {
                Ok(result) => {
                    if attempt > 1 {
                        info!("Operation succeeded after {} attempts", attempt);
                    }
                    return Ok(result);
                }
                Err(error) => {
                    let retryable = should_retry(&error);

                    if !retryable || attempt >= max_attempts {
                        warn!(
                            "Operation failed permanently on attempt {} (retryable: {}): {}",
                            attempt, retryable, error
                        );
                        return Err(error);
                    }

                    let delay = self.calculate_delay(attempt);
                    warn!(
                        "Operation failed on attempt {} (retryable), waiting {:?}: {}",
                        attempt, delay, error
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Delay to wait after the given failed attempt
    fn calculate_delay(&self, attempt: u32) -> Duration {
        self.config
            .base_delay
            .saturating_mul(attempt)
            .min(self.config.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_linear_delay_calculation() {
        let policy = RetryPolicy::new(RetryConfig::secret_cleanup());

        assert_eq!(policy.calculate_delay(1), Duration::from_secs(1));
        assert_eq!(policy.calculate_delay(2), Duration::from_secs(2));
        assert_eq!(policy.calculate_delay(3), Duration::from_secs(3));
    }

    #[test]
    fn test_max_delay_cap() {
        let config = RetryConfig {
            max_attempts: 10,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        };
        let policy = RetryPolicy::new(config);

        assert_eq!(policy.calculate_delay(4), Duration::from_secs(4));
        assert_eq!(policy.calculate_delay(5), Duration::from_secs(5));
        assert_eq!(policy.calculate_delay(10), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_retry_success_on_second_attempt() {
        let policy = RetryPolicy::new(fast(3));
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<&str, String> = policy
            .execute(
                |_| true,
                |_| {
                    let calls = calls.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                            Err("conflict".to_string())
                        } else {
                            Ok("done")
                        }
                    }
                },
            )
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let policy = RetryPolicy::new(fast(3));
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), String> = policy
            .execute(
                |e: &String| e == "conflict",
                |_| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err("forbidden".to_string())
                    }
                },
            )
            .await;

        assert_eq!(result, Err("forbidden".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let policy = RetryPolicy::new(fast(3));
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), String> = policy
            .execute(
                |_| true,
                |attempt| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err(format!("attempt {attempt}"))
                    }
                },
            )
            .await;

        assert_eq!(result, Err("attempt 3".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
