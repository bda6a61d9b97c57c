//! In-memory browser for integration tests.
//!
//! Serves a fixed set of pages. Each page is a map of CSS selector → text,
//! plus an optional list of hrefs returned for any anchor selector. URLs
//! listed in `flaky` fail their first navigation.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobscout_core::browser::{BrowserEngine, BrowserLauncher, Page};
use jobscout_core::config::{BrowserConfig, ContextProfile};
use jobscout_core::retry::ScrapeError;

#[derive(Debug, Clone, Default)]
pub struct StaticPage {
    pub texts: HashMap<String, String>,
    pub hrefs: Vec<String>,
}

impl StaticPage {
    pub fn with_text(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub fn with_links(mut self, hrefs: &[&str]) -> Self {
        self.hrefs = hrefs.iter().map(|h| h.to_string()).collect();
        self
    }
}

#[derive(Default)]
pub struct StaticWeb {
    pages: HashMap<String, StaticPage>,
    flaky: Mutex<HashSet<String>>,
    pub launches: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub open_pages: AtomicUsize,
}

impl StaticWeb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page. A URL ending in `?` serves every URL it prefixes, so
    /// tests need not spell out the encoded search state.
    pub fn page(mut self, url: &str, page: StaticPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn flaky(self, url: &str) -> Self {
        self.flaky.lock().unwrap().insert(url.to_string());
        self
    }

    fn lookup(&self, url: &str) -> Option<&StaticPage> {
        self.pages.get(url).or_else(|| {
            self.pages
                .iter()
                .find(|(key, _)| key.ends_with('?') && url.starts_with(key.as_str()))
                .map(|(_, page)| page)
        })
    }
}

pub struct StaticLauncher(pub Arc<StaticWeb>);

impl BrowserLauncher for StaticLauncher {
    type Engine = StaticEngine;

    async fn launch(&self, _settings: &BrowserConfig) -> Result<StaticEngine, ScrapeError> {
        self.0.launches.fetch_add(1, Ordering::SeqCst);
        Ok(StaticEngine(Arc::clone(&self.0)))
    }
}

pub struct StaticEngine(Arc<StaticWeb>);

impl BrowserEngine for StaticEngine {
    type Page = StaticTab;

    async fn open_page(&self, _profile: &ContextProfile) -> Result<StaticTab, ScrapeError> {
        self.0.open_pages.fetch_add(1, Ordering::SeqCst);
        Ok(StaticTab {
            web: Arc::clone(&self.0),
            current: Mutex::new(None),
        })
    }

    async fn shutdown(&self) {
        self.0.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct StaticTab {
    web: Arc<StaticWeb>,
    current: Mutex<Option<StaticPage>>,
}

impl Page for StaticTab {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        if self.web.flaky.lock().unwrap().remove(url) {
            return Err(ScrapeError::NavigationTimeout {
                url: url.to_string(),
                timeout,
            });
        }
        let page = self.web.lookup(url).cloned().ok_or_else(|| ScrapeError::Navigation {
            url: url.to_string(),
            reason: "404".to_string(),
        })?;
        *self.current.lock().unwrap() = Some(page);
        Ok(())
    }

    async fn wait_for_selector(&self, _selector: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        Ok(())
    }

    async fn hrefs(&self, _selector: &str) -> Result<Vec<String>, ScrapeError> {
        Ok(self
            .current
            .lock()
            .unwrap()
            .as_ref()
            .map(|p| p.hrefs.clone())
            .unwrap_or_default())
    }

    async fn text(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        Ok(self
            .current
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|p| p.texts.get(selector).cloned()))
    }

    async fn close(self) {
        self.web.open_pages.fetch_sub(1, Ordering::SeqCst);
    }
}
