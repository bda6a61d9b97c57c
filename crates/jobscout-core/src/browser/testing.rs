//! Scripted in-memory browser for unit tests.
//!
//! A [`FakeSite`] maps URLs to documents (selector → text / hrefs), can fail
//! the next N navigations of a URL with scripted errors, and records launch,
//! shutdown, navigation and in-flight counts so tests can assert on them.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BrowserEngine, BrowserLauncher, Page};
use crate::config::{BrowserConfig, ContextProfile};
use crate::retry::ScrapeError;

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeDocument {
    texts: HashMap<String, String>,
    hrefs: HashMap<String, Vec<String>>,
    ready: HashSet<String>,
}

impl FakeDocument {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn text(mut self, selector: &str, text: &str) -> Self {
        self.texts.insert(selector.to_string(), text.to_string());
        self
    }

    pub(crate) fn links(mut self, selector: &str, hrefs: &[&str]) -> Self {
        self.hrefs
            .insert(selector.to_string(), hrefs.iter().map(|s| s.to_string()).collect());
        self
    }

    pub(crate) fn ready(mut self, selector: &str) -> Self {
        self.ready.insert(selector.to_string());
        self
    }
}

#[derive(Default)]
pub(crate) struct FakeSiteBuilder {
    documents: HashMap<String, FakeDocument>,
    failures: HashMap<String, VecDeque<ScrapeError>>,
    nav_delay: Duration,
    launch_delay: Duration,
    fail_launch: bool,
}

impl FakeSiteBuilder {
    pub(crate) fn page(mut self, url: &str, doc: FakeDocument) -> Self {
        self.documents.insert(url.to_string(), doc);
        self
    }

    /// Fail the next navigations to `url` with these errors, in order.
    pub(crate) fn fail(mut self, url: &str, errors: Vec<ScrapeError>) -> Self {
        self.failures
            .entry(url.to_string())
            .or_default()
            .extend(errors);
        self
    }

    pub(crate) fn nav_delay(mut self, delay: Duration) -> Self {
        self.nav_delay = delay;
        self
    }

    pub(crate) fn launch_delay(mut self, delay: Duration) -> Self {
        self.launch_delay = delay;
        self
    }

    pub(crate) fn fail_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub(crate) fn build(self) -> Arc<FakeSite> {
        Arc::new(FakeSite {
            documents: self.documents,
            failures: Mutex::new(self.failures),
            nav_delay: self.nav_delay,
            launch_delay: self.launch_delay,
            fail_launch: self.fail_launch,
            launches: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            open_pages: AtomicUsize::new(0),
            max_open_pages: AtomicUsize::new(0),
            navigations: Mutex::new(Vec::new()),
        })
    }
}

pub(crate) struct FakeSite {
    documents: HashMap<String, FakeDocument>,
    failures: Mutex<HashMap<String, VecDeque<ScrapeError>>>,
    nav_delay: Duration,
    launch_delay: Duration,
    fail_launch: bool,
    launches: AtomicUsize,
    shutdowns: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    open_pages: AtomicUsize,
    max_open_pages: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

impl FakeSite {
    pub(crate) fn builder() -> FakeSiteBuilder {
        FakeSiteBuilder::default()
    }

    pub(crate) fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub(crate) fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    /// Highest number of navigations observed in progress at once.
    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn open_pages(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }

    pub(crate) fn max_open_pages(&self) -> usize {
        self.max_open_pages.load(Ordering::SeqCst)
    }

    pub(crate) fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }

    pub(crate) fn navigation_count(&self, url: &str) -> usize {
        self.navigations
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    fn next_failure(&self, url: &str) -> Option<ScrapeError> {
        self.failures
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
    }
}

fn bump_max(counter: &AtomicUsize, max: &AtomicUsize) {
    let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
    max.fetch_max(now, Ordering::SeqCst);
}

pub(crate) struct FakeLauncher {
    site: Arc<FakeSite>,
}

impl FakeLauncher {
    pub(crate) fn new(site: Arc<FakeSite>) -> Self {
        Self { site }
    }
}

impl BrowserLauncher for FakeLauncher {
    type Engine = FakeEngine;

    async fn launch(&self, _settings: &BrowserConfig) -> Result<FakeEngine, ScrapeError> {
        self.site.launches.fetch_add(1, Ordering::SeqCst);
        if !self.site.launch_delay.is_zero() {
            tokio::time::sleep(self.site.launch_delay).await;
        }
        if self.site.fail_launch {
            return Err(ScrapeError::BrowserLaunch("chrome binary not found".to_string()));
        }
        Ok(FakeEngine {
            site: Arc::clone(&self.site),
        })
    }
}

pub(crate) struct FakeEngine {
    site: Arc<FakeSite>,
}

impl BrowserEngine for FakeEngine {
    type Page = FakePage;

    async fn open_page(&self, profile: &ContextProfile) -> Result<FakePage, ScrapeError> {
        bump_max(&self.site.open_pages, &self.site.max_open_pages);
        Ok(FakePage {
            site: Arc::clone(&self.site),
            profile: profile.clone(),
            current: Mutex::new(None),
        })
    }

    async fn shutdown(&self) {
        self.site.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct FakePage {
    site: Arc<FakeSite>,
    profile: ContextProfile,
    current: Mutex<Option<String>>,
}

impl std::fmt::Debug for FakePage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakePage")
            .field("profile", &self.profile)
            .field("current", &self.current.lock().unwrap())
            .finish()
    }
}

impl FakePage {
    pub(crate) fn profile(&self) -> &ContextProfile {
        &self.profile
    }

    fn document(&self) -> Option<FakeDocument> {
        let current = self.current.lock().unwrap().clone()?;
        self.site.documents.get(&current).cloned()
    }
}

impl Page for FakePage {
    async fn goto(&self, url: &str, _timeout: Duration) -> Result<(), ScrapeError> {
        bump_max(&self.site.in_flight, &self.site.max_in_flight);
        self.site.navigations.lock().unwrap().push(url.to_string());
        if !self.site.nav_delay.is_zero() {
            tokio::time::sleep(self.site.nav_delay).await;
        }
        let failure = self.site.next_failure(url);
        self.site.in_flight.fetch_sub(1, Ordering::SeqCst);
        if let Some(err) = failure {
            return Err(err);
        }
        if !self.site.documents.contains_key(url) {
            return Err(ScrapeError::Navigation {
                url: url.to_string(),
                reason: "404".to_string(),
            });
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let ready = self
            .document()
            .map(|d| d.ready.contains(selector) || d.texts.contains_key(selector))
            .unwrap_or(false);
        if ready {
            Ok(())
        } else {
            tokio::time::sleep(timeout).await;
            Err(ScrapeError::ElementNotFound {
                selector: selector.to_string(),
                url: self.current.lock().unwrap().clone().unwrap_or_default(),
            })
        }
    }

    async fn hrefs(&self, selector: &str) -> Result<Vec<String>, ScrapeError> {
        Ok(self
            .document()
            .and_then(|d| d.hrefs.get(selector).cloned())
            .unwrap_or_default())
    }

    async fn text(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        Ok(self
            .document()
            .and_then(|d| d.texts.get(selector).cloned())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()))
    }

    async fn close(self) {
        self.site.open_pages.fetch_sub(1, Ordering::SeqCst);
    }
}
