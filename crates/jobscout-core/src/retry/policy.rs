use std::time::Duration;

use crate::config::RetryConfig;

/// High-level classification of an error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Navigation timed out.
    Timeout,
    /// Expected element missing (page not hydrated yet, or markup changed).
    MissingElement,
    /// Site appears to be throttling us; retry with an extended delay.
    RateLimited,
    /// Network-level navigation failure.
    Connection,
    /// Resource acquisition failure; abort the run.
    Fatal,
    /// Any other error (skipped without retry).
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry; the item is skipped.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
    /// Stop everything; the error is fatal for the run.
    Abort,
}

/// Linear backoff policy: attempt N waits `base_delay × N`, capped.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Extra factor for rate-limited attempts.
    pub rate_limit_multiplier: u32,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(cfg.base_delay_secs.max(0.0)),
            rate_limit_multiplier: cfg.rate_limit_multiplier.max(1),
            max_delay: Duration::from_secs(cfg.max_delay_secs),
        }
    }

    /// Same policy with a different attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Decide what to do after `attempt` (1-based) failed with `kind`.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        match kind {
            ErrorKind::Fatal => return RetryDecision::Abort,
            ErrorKind::Other => return RetryDecision::NoRetry,
            _ => {}
        }
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        let mut delay = self.base_delay.saturating_mul(attempt.max(1));
        if kind == ErrorKind::RateLimited {
            delay = delay.saturating_mul(self.rate_limit_multiplier);
        }
        RetryDecision::RetryAfter(delay.min(self.max_delay))
    }
}
