//! Retry policy implementation.

use std::time::Duration;
use tracing::debug;

/// Retry policy configuration.
///
/// Retry `n` waits `min(n * step, cap)` before running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay added per retry.
    pub step: Duration,
    /// Upper bound on any single delay.
    pub cap: Duration,
}

impl RetryPolicy {
    /// Policy used when connecting to the cache store: three attempts,
    /// 50ms per attempt, never more than two seconds.
    #[must_use]
    pub fn connection_default() -> Self {
        Self::linear(3, Duration::from_millis(50), Duration::from_millis(2000))
    }

    /// Creates a linear backoff policy.
    #[must_use]
    pub fn linear(max_attempts: u32, step: Duration, cap: Duration) -> Self {
        Self {
            max_attempts,
            step,
            cap,
        }
    }

    /// Calculates the delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.step.saturating_mul(attempt).min(self.cap)
    }

    /// Executes a function with retry logic.
    ///
    /// Runs at most `max_attempts` attempts (at least one) and returns the
    /// last error if all of them fail.
    pub async fn execute<F, Fut, T, E>(&self, mut f: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            if attempt > 0 {
                let delay = self.delay_for_attempt(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after backoff");
                tokio::time::sleep(delay).await;
            }

            match f().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;
                    debug!(attempt, max_attempts = attempts, error = %e, "Attempt failed");
                    if attempt >= attempts {
                        return Err(e);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_retry_success() {
        let policy = RetryPolicy::connection_default();
        let result: Result<i32, &str> = policy.execute(|| async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_eventual_success() {
        let policy = RetryPolicy::connection_default();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<i32, &str> = policy
            .execute(|| {
                let attempts = attempts_clone.clone();
                async move {
                    let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err("not yet")
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_counts_exact_attempts() {
        let policy = RetryPolicy::connection_default();
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = attempts.clone();

        let result: Result<i32, String> = policy
            .execute(|| {
                let a = attempts_clone.clone();
                async move {
                    let n = a.fetch_add(1, Ordering::SeqCst) + 1;
                    Err(format!("failure {n}"))
                }
            })
            .await;

        assert_eq!(result.unwrap_err(), "failure 3");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_default_waits_linear_backoff() {
        let policy = RetryPolicy::connection_default();
        let start = tokio::time::Instant::now();

        let result: Result<(), &str> = policy.execute(|| async { Err("refused") }).await;

        assert!(result.is_err());
        // 50ms before the second attempt, 100ms before the third
        assert_eq!(start.elapsed(), Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let policy = RetryPolicy::linear(0, Duration::from_millis(1), Duration::from_millis(1));
        let attempts = AtomicU32::new(0);

        let result: Result<i32, &str> = policy
            .execute(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err("fail") }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_delay_for_attempt_zero() {
        let policy = RetryPolicy::connection_default();
        assert_eq!(policy.delay_for_attempt(0), Duration::ZERO);
    }

    #[test]
    fn test_linear_delay_capped() {
        let policy = RetryPolicy::connection_default();
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(50));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(150));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Duration::from_millis(2000));
    }

    #[test]
    fn test_linear_constructor() {
        let policy = RetryPolicy::linear(5, Duration::from_millis(10), Duration::from_millis(25));
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(20));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(25));
    }
}
