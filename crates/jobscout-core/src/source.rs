//! Job sources: anything that can turn a search request into postings.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

use crate::browser::{BrowserLauncher, BrowserManager};
use crate::collector::LinkCollector;
use crate::config::{RetryConfig, ScraperConfig, SiteConfig};
use crate::fetcher::{DetailFetcher, SkippedLink};
use crate::model::JobPosting;
use crate::retry::ScrapeError;
use crate::search_url::{build_search_url, SearchQuery, SearchUrlError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    InvalidQuery(#[from] SearchUrlError),
    #[error("invalid site configuration: {0}")]
    InvalidSite(String),
    #[error("collecting job links failed: {0}")]
    Collection(ScrapeError),
    #[error("fetching job details failed: {0}")]
    Fetch(ScrapeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: SearchQuery,
    /// Maximum number of postings to fetch.
    pub limit: usize,
}

/// What one search produced, before scoring.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub search_url: String,
    pub links_found: usize,
    pub postings: Vec<JobPosting>,
    pub skipped: Vec<SkippedLink>,
    pub not_scheduled: usize,
    pub retried: usize,
}

pub trait JobSource: Send + Sync {
    /// Name recorded as the source of every posting.
    fn name(&self) -> &str;

    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<SearchOutcome, SourceError>> + Send;
}

/// A site scraped through the shared browser.
pub struct BrowserJobSource<L: BrowserLauncher> {
    site: SiteConfig,
    manager: Arc<BrowserManager<L>>,
    collector: LinkCollector,
    fetcher: DetailFetcher,
}

impl<L: BrowserLauncher> BrowserJobSource<L> {
    pub fn new(
        site: SiteConfig,
        scraper: &ScraperConfig,
        retry: &RetryConfig,
        manager: Arc<BrowserManager<L>>,
    ) -> Result<Self, SourceError> {
        let collector = LinkCollector::new(&site, scraper, retry).map_err(|e| {
            SourceError::InvalidSite(format!("detail_link_pattern {:?}: {e}", site.detail_link_pattern))
        })?;
        let fetcher = DetailFetcher::from_config(&site, scraper, retry);
        Ok(Self {
            site,
            manager,
            collector,
            fetcher,
        })
    }
}

impl<L: BrowserLauncher> JobSource for BrowserJobSource<L> {
    fn name(&self) -> &str {
        &self.site.name
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, SourceError> {
        let search_url = build_search_url(&self.site.base_url, &self.site.search_param, &request.query)?;
        tracing::info!(source = %self.site.name, query = %request.query.text, "searching");

        let links = self
            .collector
            .collect(&self.manager, &search_url, request.limit)
            .await
            .map_err(SourceError::Collection)?;
        if links.is_empty() {
            return Ok(SearchOutcome {
                search_url,
                ..SearchOutcome::default()
            });
        }

        let report = self
            .fetcher
            .fetch_all(&self.manager, &links.links)
            .await
            .map_err(SourceError::Fetch)?;
        Ok(SearchOutcome {
            search_url,
            links_found: links.links.len(),
            postings: report.postings,
            skipped: report.skipped,
            not_scheduled: report.not_scheduled,
            retried: report.retried,
        })
    }
}
