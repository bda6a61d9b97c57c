//! Scraper error type for retry classification.

use std::time::Duration;
use thiserror::Error;

/// Error from a single browser operation (launch, navigation, DOM query).
/// Kept typed so callers can classify and decide retries before reporting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScrapeError {
    /// Navigation did not finish within the per-navigation timeout.
    #[error("navigation to {url} timed out after {}s", timeout.as_secs())]
    NavigationTimeout { url: String, timeout: Duration },
    /// Navigation failed for another reason (network error, bad response).
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    /// A required element was not present on the page.
    #[error("no element matching {selector} on {url}")]
    ElementNotFound { selector: String, url: String },
    /// The page looks like a rate-limit or bot-check interstitial.
    #[error("suspected rate limiting on {url}")]
    SuspectedRateLimit { url: String },
    /// DOM evaluation failed or returned something unusable.
    #[error("script evaluation failed: {0}")]
    Script(String),
    /// The browser process could not be started. Fatal for the run.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),
    /// A page was requested from a context that is not configured.
    #[error("unknown browsing context: {0}")]
    UnknownContext(String),
    /// The browser was shut down while work still wanted pages.
    #[error("browser has been shut down")]
    BrowserClosed,
    /// A fetch task panicked or was cancelled.
    #[error("fetch task failed: {0}")]
    Task(String),
}

impl ScrapeError {
    /// Errors that mean the run cannot continue (resource acquisition).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ScrapeError::BrowserLaunch(_) | ScrapeError::UnknownContext(_) | ScrapeError::BrowserClosed
        )
    }
}
