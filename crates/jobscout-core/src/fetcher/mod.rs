//! Concurrent detail-page fetching.
//!
//! Links are processed in batches of at most `concurrency` tasks. Every task
//! retries its link per the retry policy, each attempt on its own page.
//! Between batches the rate limiter pauses (longer when the batch hit a
//! suspected rate limit). Results are slotted by input index so the output
//! keeps the collector's order.

mod extract;

pub use extract::{infer_location_types, parse_salary};

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::browser::{BrowserLauncher, BrowserManager, Page};
use crate::config::{RetryConfig, ScraperConfig, SelectorConfig, SiteConfig};
use crate::model::JobPosting;
use crate::rate_limit::BatchRateLimiter;
use crate::retry::{run_with_retry, RetryOutcome, RetryPolicy, ScrapeError};

/// Per-run knobs shared by every fetch task.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub concurrency: usize,
    pub navigation_timeout: Duration,
    /// Pause after navigation before reading the DOM.
    pub detail_settle: Duration,
    pub context: String,
    /// Site name recorded on every posting.
    pub source: String,
    pub selectors: SelectorConfig,
    pub overall_budget: Option<Duration>,
}

impl FetchSettings {
    pub fn from_config(site: &SiteConfig, scraper: &ScraperConfig) -> Self {
        Self {
            concurrency: scraper.concurrency.max(1),
            navigation_timeout: scraper.navigation_timeout(),
            detail_settle: Duration::from_millis(scraper.detail_settle_ms),
            context: site.context.clone(),
            source: site.name.clone(),
            selectors: site.selectors.clone(),
            overall_budget: scraper.overall_budget(),
        }
    }
}

/// A link given up on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedLink {
    pub url: String,
    pub error: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Successfully fetched postings, in input link order.
    pub postings: Vec<JobPosting>,
    pub skipped: Vec<SkippedLink>,
    /// Links never started because the time budget ran out.
    pub not_scheduled: usize,
    /// Links that needed more than one attempt.
    pub retried: usize,
    /// Pauses taken between batches.
    pub pauses: Vec<Duration>,
}

pub struct DetailFetcher {
    settings: Arc<FetchSettings>,
    retry: RetryPolicy,
    limiter: BatchRateLimiter,
}

struct LinkResult {
    index: usize,
    outcome: RetryOutcome<JobPosting>,
    rate_limited: bool,
}

impl DetailFetcher {
    pub fn new(settings: FetchSettings, retry: RetryPolicy, limiter: BatchRateLimiter) -> Self {
        Self {
            settings: Arc::new(settings),
            retry,
            limiter,
        }
    }

    pub fn from_config(site: &SiteConfig, scraper: &ScraperConfig, retry: &RetryConfig) -> Self {
        Self::new(
            FetchSettings::from_config(site, scraper),
            RetryPolicy::from_config(retry),
            BatchRateLimiter::from_config(scraper),
        )
    }

    /// Fetch every link. Per-link failures are recorded as skipped; only a
    /// fatal browser error fails the whole call, once the batch in flight
    /// has drained.
    pub async fn fetch_all<L: BrowserLauncher>(
        &self,
        manager: &Arc<BrowserManager<L>>,
        links: &[String],
    ) -> Result<FetchReport, ScrapeError> {
        let batch_size = self.settings.concurrency.max(1);
        let deadline = self.settings.overall_budget.map(|budget| Instant::now() + budget);
        let mut slots: Vec<Option<JobPosting>> = vec![None; links.len()];
        let mut report = FetchReport::default();
        let mut throttled = false;

        tracing::info!(links = links.len(), concurrency = batch_size, "fetching job details");

        for (batch_no, batch) in links.chunks(batch_size).enumerate() {
            let offset = batch_no * batch_size;
            let expired = || deadline.is_some_and(|d| Instant::now() >= d);
            if batch_no > 0 && !expired() {
                report.pauses.push(self.limiter.pause(throttled).await);
            }
            if expired() {
                report.not_scheduled = links.len() - offset;
                tracing::warn!(not_scheduled = report.not_scheduled, "time budget exhausted, stopping");
                break;
            }

            let mut tasks = JoinSet::new();
            for (i, url) in batch.iter().enumerate() {
                let manager = Arc::clone(manager);
                let settings = Arc::clone(&self.settings);
                let retry = self.retry;
                let url = url.clone();
                let index = offset + i;
                tasks.spawn(async move { fetch_link(manager, settings, retry, url, index).await });
            }

            throttled = false;
            let mut fatal: Option<ScrapeError> = None;
            let mut resolved = HashSet::new();
            while let Some(joined) = tasks.join_next().await {
                let result = match joined {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::error!("fetch task failed: {e}");
                        continue;
                    }
                };
                resolved.insert(result.index);
                throttled |= result.rate_limited;
                let url = &links[result.index];
                match result.outcome {
                    RetryOutcome::Succeeded { value, attempts } => {
                        if attempts > 1 {
                            report.retried += 1;
                        }
                        slots[result.index] = Some(value);
                    }
                    RetryOutcome::Exhausted { error, attempts } => {
                        tracing::warn!(url = %url, attempts, %error, "skipping job link");
                        report.skipped.push(SkippedLink {
                            url: url.clone(),
                            error: error.to_string(),
                            attempts,
                        });
                    }
                    RetryOutcome::Aborted { error, attempts } => {
                        report.skipped.push(SkippedLink {
                            url: url.clone(),
                            error: error.to_string(),
                            attempts,
                        });
                        fatal.get_or_insert(error);
                    }
                }
            }

            for index in offset..offset + batch.len() {
                if !resolved.contains(&index) {
                    report.skipped.push(SkippedLink {
                        url: links[index].clone(),
                        error: ScrapeError::Task("fetch task panicked".to_string()).to_string(),
                        attempts: 0,
                    });
                }
            }

            if let Some(error) = fatal {
                tracing::error!(%error, "aborting detail fetch");
                return Err(error);
            }
        }

        report.postings = slots.into_iter().flatten().collect();
        tracing::info!(
            fetched = report.postings.len(),
            skipped = report.skipped.len(),
            retried = report.retried,
            not_scheduled = report.not_scheduled,
            "detail fetch finished"
        );
        Ok(report)
    }
}

async fn fetch_link<L: BrowserLauncher>(
    manager: Arc<BrowserManager<L>>,
    settings: Arc<FetchSettings>,
    retry: RetryPolicy,
    url: String,
    index: usize,
) -> LinkResult {
    let rate_limited = AtomicBool::new(false);
    let (manager, settings, url_ref, flag) = (&*manager, &*settings, url.as_str(), &rate_limited);
    let outcome = run_with_retry(&retry, |attempt| async move {
        tracing::debug!(url = url_ref, attempt, "fetching job detail");
        let page = manager.get_page(&settings.context).await?;
        let result = extract::extract_posting(&page, url_ref, settings).await;
        page.close().await;
        if matches!(result, Err(ScrapeError::SuspectedRateLimit { .. })) {
            flag.store(true, Ordering::Relaxed);
        }
        result
    })
    .await;
    LinkResult {
        index,
        outcome,
        rate_limited: rate_limited.load(Ordering::Relaxed),
    }
}
