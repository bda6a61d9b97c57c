//! Inter-batch pacing.
//!
//! After every batch of concurrent detail fetches the fetcher pauses for the
//! base delay scaled by a uniform jitter factor in `[1 - j, 1 + j]`. A batch
//! that ran into rate limiting stretches the next pause by the throttle
//! penalty, mirroring how a host that pushes back gets less pressure.

use rand::Rng;
use std::time::Duration;

use crate::config::ScraperConfig;

#[derive(Debug, Clone, Copy)]
pub struct BatchRateLimiter {
    base_delay: Duration,
    jitter_ratio: f64,
    throttle_penalty: f64,
}

impl BatchRateLimiter {
    /// `jitter_ratio` is clamped to `[0, 0.95]` and `throttle_penalty` to `>= 1`.
    pub fn new(base_delay: Duration, jitter_ratio: f64, throttle_penalty: f64) -> Self {
        let jitter_ratio = if jitter_ratio.is_finite() {
            jitter_ratio.clamp(0.0, 0.95)
        } else {
            0.0
        };
        let throttle_penalty = if throttle_penalty.is_finite() {
            throttle_penalty.max(1.0)
        } else {
            1.0
        };
        Self {
            base_delay,
            jitter_ratio,
            throttle_penalty,
        }
    }

    pub fn from_config(cfg: &ScraperConfig) -> Self {
        Self::new(
            Duration::from_millis(cfg.base_delay_ms),
            cfg.jitter_ratio,
            cfg.throttle_penalty,
        )
    }

    pub fn jitter_ratio(&self) -> f64 {
        self.jitter_ratio
    }

    /// Smallest pause an unthrottled batch can get.
    pub fn min_delay(&self) -> Duration {
        self.base_delay.mul_f64(1.0 - self.jitter_ratio)
    }

    /// Largest pause an unthrottled batch can get.
    pub fn max_delay(&self) -> Duration {
        self.base_delay.mul_f64(1.0 + self.jitter_ratio)
    }

    /// Draw the next pause from `rng`.
    pub fn next_delay<R: Rng>(&self, rng: &mut R, throttled: bool) -> Duration {
        let factor = if self.jitter_ratio > 0.0 {
            rng.gen_range((1.0 - self.jitter_ratio)..=(1.0 + self.jitter_ratio))
        } else {
            1.0
        };
        let penalty = if throttled { self.throttle_penalty } else { 1.0 };
        self.base_delay.mul_f64(factor * penalty)
    }

    /// Sleep between batches. Returns the pause that was taken.
    pub async fn pause(&self, throttled: bool) -> Duration {
        let delay = self.next_delay(&mut rand::thread_rng(), throttled);
        tracing::debug!(delay_ms = delay.as_millis() as u64, throttled, "pausing between batches");
        tokio::time::sleep(delay).await;
        delay
    }
}
