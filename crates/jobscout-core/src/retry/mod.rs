//! Retry and backoff policy.
//!
//! This module encapsulates the scraper's error taxonomy, its classification
//! into retry kinds (timeouts, missing elements, rate limiting, fatal
//! resource failures) and the linear backoff decisions, so that the link
//! collector and the detail fetcher share one consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::classify;
pub use error::ScrapeError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, RetryOutcome};
