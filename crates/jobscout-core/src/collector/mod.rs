//! Search-page link collection.
//!
//! Loads the search view, waits for client-side rendering to settle, and
//! returns the detail-page links it lists: resolved against the search URL,
//! fragment-free, matching the site's detail pattern, deduplicated in
//! first-seen order and capped to the requested limit.

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::browser::{BrowserLauncher, BrowserManager, Page};
use crate::config::{ReadySignal, RetryConfig, ScraperConfig, SiteConfig};
use crate::retry::{run_with_retry, RetryOutcome, RetryPolicy, ScrapeError};

/// Links found on one search page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkCollection {
    pub links: Vec<String>,
    /// Raw anchors seen before filtering.
    pub anchors_seen: usize,
    pub attempts: u32,
}

impl LinkCollection {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

pub struct LinkCollector {
    link_selector: String,
    detail_pattern: Regex,
    ready: ReadySignal,
    context: String,
    navigation_timeout: Duration,
    policy: RetryPolicy,
}

impl LinkCollector {
    /// Fails only if `detail_link_pattern` is not a valid regex.
    pub fn new(
        site: &SiteConfig,
        scraper: &ScraperConfig,
        retry: &RetryConfig,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            link_selector: site.link_selector.clone(),
            detail_pattern: Regex::new(&site.detail_link_pattern)?,
            ready: site.ready.clone(),
            context: site.context.clone(),
            navigation_timeout: scraper.navigation_timeout(),
            policy: RetryPolicy::from_config(retry).with_max_attempts(scraper.collect_attempts.max(1)),
        })
    }

    /// Collect up to `limit` detail links from `search_url`.
    ///
    /// Navigation is retried per the collector's policy; when every attempt
    /// fails the last error is returned. A page listing nothing is an empty
    /// collection, not an error.
    pub async fn collect<L: BrowserLauncher>(
        &self,
        manager: &BrowserManager<L>,
        search_url: &str,
        limit: usize,
    ) -> Result<LinkCollection, ScrapeError> {
        tracing::info!(url = search_url, limit, "collecting job links");
        let outcome = run_with_retry(&self.policy, |attempt| async move {
            tracing::debug!(attempt, "loading search page");
            let page = manager.get_page(&self.context).await?;
            let result = self.load_and_read(&page, search_url).await;
            page.close().await;
            result
        })
        .await;

        match outcome {
            RetryOutcome::Succeeded { value: hrefs, attempts } => {
                let anchors_seen = hrefs.len();
                let links = filter_links(search_url, &hrefs, &self.detail_pattern, limit);
                if links.is_empty() {
                    tracing::warn!(anchors_seen, "search page listed no job links");
                } else {
                    tracing::info!(found = links.len(), anchors_seen, "collected job links");
                }
                Ok(LinkCollection {
                    links,
                    anchors_seen,
                    attempts,
                })
            }
            RetryOutcome::Exhausted { error, attempts } | RetryOutcome::Aborted { error, attempts } => {
                tracing::error!(attempts, %error, "link collection failed");
                Err(error)
            }
        }
    }

    async fn load_and_read<P: Page>(&self, page: &P, url: &str) -> Result<Vec<String>, ScrapeError> {
        page.goto(url, self.navigation_timeout).await?;
        self.wait_until_ready(page).await;
        page.hrefs(&self.link_selector).await
    }

    async fn wait_until_ready<P: Page>(&self, page: &P) {
        if let Some(selector) = &self.ready.selector {
            let timeout = Duration::from_millis(self.ready.selector_timeout_ms);
            match page.wait_for_selector(selector, timeout).await {
                Ok(()) => return,
                Err(e) => tracing::warn!("ready selector not seen, falling back to settle delay: {e}"),
            }
        }
        if self.ready.settle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.ready.settle_ms)).await;
        }
    }
}

/// Resolve, filter and deduplicate raw hrefs.
pub fn filter_links(base: &str, hrefs: &[String], pattern: &Regex, limit: usize) -> Vec<String> {
    let base = Url::parse(base).ok();
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for href in hrefs {
        if links.len() >= limit {
            break;
        }
        let resolved = match &base {
            Some(base) => base.join(href.trim()),
            None => Url::parse(href.trim()),
        };
        let mut url = match resolved {
            Ok(url) => url,
            Err(_) => continue,
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        url.set_fragment(None);
        let url = url.to_string();
        if pattern.is_match(&url) && seen.insert(url.clone()) {
            links.push(url);
        }
    }
    links
}
