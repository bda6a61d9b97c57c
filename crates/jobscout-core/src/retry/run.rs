//! Retry loop: run an async attempt until success or policy says stop.

use std::future::Future;

use super::classify;
use super::error::ScrapeError;
use super::policy::{RetryDecision, RetryPolicy};

/// How a retried operation ended. Callers branch on this instead of on
/// error types: `Exhausted` means skip the item, `Aborted` means stop the run.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { error: ScrapeError, attempts: u32 },
    Aborted { error: ScrapeError, attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. } => *attempts,
        }
    }
}

/// Runs `attempt_fn` (given the 1-based attempt number) until it succeeds or
/// the retry policy says to stop. On a retryable failure, sleeps for the
/// backoff duration then tries again.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, mut attempt_fn: F) -> RetryOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let mut attempt = 1u32;
    loop {
        match attempt_fn(attempt).await {
            Ok(value) => {
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                }
            }
            Err(error) => {
                let kind = classify::classify(&error);
                match policy.decide(attempt, kind) {
                    RetryDecision::Abort => {
                        return RetryOutcome::Aborted {
                            error,
                            attempts: attempt,
                        }
                    }
                    RetryDecision::NoRetry => {
                        return RetryOutcome::Exhausted {
                            error,
                            attempts: attempt,
                        }
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, ?kind, delay_ms = d.as_millis() as u64, %error, "retrying");
                        tokio::time::sleep(d).await;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            rate_limit_multiplier: 3,
            max_delay: Duration::from_secs(5),
        }
    }

    fn timeout() -> ScrapeError {
        ScrapeError::NavigationTimeout {
            url: "https://example.com".into(),
            timeout: Duration::from_secs(30),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_third_attempt_after_linear_backoff() {
        let start = tokio::time::Instant::now();
        let out = run_with_retry(&policy(), |attempt| async move {
            if attempt < 3 {
                Err(timeout())
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(out, RetryOutcome::Succeeded { value: 3, attempts: 3 });
        // 100ms after attempt 1, 200ms after attempt 2.
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts() {
        let out: RetryOutcome<()> = run_with_retry(&policy(), |_| async { Err(timeout()) }).await;
        assert_eq!(out.attempts(), 3);
        assert!(matches!(out, RetryOutcome::Exhausted { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn fatal_error_aborts_immediately() {
        let mut calls = 0;
        let out: RetryOutcome<()> = run_with_retry(&policy(), |_| {
            calls += 1;
            async { Err(ScrapeError::BrowserLaunch("no chrome".into())) }
        })
        .await;
        assert_eq!(calls, 1);
        assert!(matches!(out, RetryOutcome::Aborted { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_skips_without_delay() {
        let start = tokio::time::Instant::now();
        let out: RetryOutcome<()> =
            run_with_retry(&policy(), |_| async { Err(ScrapeError::Script("boom".into())) }).await;
        assert!(matches!(out, RetryOutcome::Exhausted { attempts: 1, .. }));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
