//! Bounded retry policy for model calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::llm_client::LlmError;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// At most `max_attempts` calls, sleeping a fixed `delay` between them.
/// Non-retryable errors end the loop immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl RetryPolicy {
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Runs `operation` (given the 1-based attempt number) until it succeeds,
    /// fails with a non-retryable error, or the attempts run out. Returns the
    /// last error in the failure cases.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, LlmError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    warn!(
                        "LLM call attempt {}/{} failed: {}; retrying after {}ms",
                        attempt,
                        max_attempts,
                        e,
                        self.delay.as_millis()
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    fn api_error(status: u16) -> LlmError {
        LlmError::Api {
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_default_is_three_attempts_two_seconds_apart() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts_with_fixed_delay() {
        let calls = Cell::new(0);
        let started = Instant::now();

        let result: Result<(), LlmError> = RetryPolicy::default()
            .run(|_| {
                calls.set(calls.get() + 1);
                async { Err(api_error(503)) }
            })
            .await;

        assert!(matches!(result, Err(LlmError::Api { status: 503, .. })));
        assert_eq!(calls.get(), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_second_attempt() {
        let result = RetryPolicy::default()
            .run(|attempt| async move {
                if attempt == 1 {
                    Err(api_error(429))
                } else {
                    Ok(attempt)
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = Cell::new(0);
        let result: Result<(), LlmError> = RetryPolicy::fixed(3, Duration::ZERO)
            .run(|_| {
                calls.set(calls.get() + 1);
                async { Err(api_error(401)) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_calls_once() {
        let calls = Cell::new(0);
        let _ = RetryPolicy::fixed(0, Duration::ZERO)
            .run(|_| {
                calls.set(calls.get() + 1);
                async { Ok::<_, LlmError>(()) }
            })
            .await;
        assert_eq!(calls.get(), 1);
    }
}
