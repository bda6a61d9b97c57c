//! Classify scraper errors into retry policy error kinds.

use super::error::ScrapeError;
use super::policy::ErrorKind;

/// Classify a scrape error into an ErrorKind.
pub fn classify(e: &ScrapeError) -> ErrorKind {
    match e {
        ScrapeError::NavigationTimeout { .. } => ErrorKind::Timeout,
        ScrapeError::Navigation { .. } => ErrorKind::Connection,
        ScrapeError::ElementNotFound { .. } => ErrorKind::MissingElement,
        ScrapeError::SuspectedRateLimit { .. } => ErrorKind::RateLimited,
        ScrapeError::BrowserLaunch(_)
        | ScrapeError::UnknownContext(_)
        | ScrapeError::BrowserClosed => ErrorKind::Fatal,
        ScrapeError::Script(_) | ScrapeError::Task(_) => ErrorKind::Other,
    }
}
