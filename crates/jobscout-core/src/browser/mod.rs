//! Browser resource management.
//!
//! One [`BrowserManager`] owns the browser process for a run. It launches
//! the engine lazily on first use (serialized, so concurrent first callers
//! never start two browsers), hands out named browsing contexts built from
//! configured fingerprints, and opens pages on them. Pages belong to the task
//! that asked for them and are closed by that task.
//!
//! The engine sits behind the [`BrowserLauncher`] / [`BrowserEngine`] /
//! [`Page`] traits; production uses headless Chrome ([`chrome`]), tests use
//! scripted doubles.

pub mod chrome;
#[cfg(test)]
pub(crate) mod testing;

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::config::{BrowserConfig, ContextProfile};
use crate::retry::ScrapeError;

/// Starts a browser engine.
pub trait BrowserLauncher: Send + Sync + 'static {
    type Engine: BrowserEngine;

    fn launch(
        &self,
        settings: &BrowserConfig,
    ) -> impl Future<Output = Result<Self::Engine, ScrapeError>> + Send;
}

/// A running browser that can open pages.
pub trait BrowserEngine: Send + Sync + 'static {
    type Page: Page;

    /// Open a fresh page presenting `profile`'s fingerprint.
    fn open_page(
        &self,
        profile: &ContextProfile,
    ) -> impl Future<Output = Result<Self::Page, ScrapeError>> + Send;

    /// Close whatever is still open and stop the browser.
    fn shutdown(&self) -> impl Future<Output = ()> + Send;
}

/// One browser tab. Never shared between concurrent tasks.
pub trait Page: Send + Sync + 'static {
    /// Navigate and wait for the load to finish, bounded by `timeout`.
    fn goto(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ScrapeError>> + Send;

    /// Wait until `selector` matches something, bounded by `timeout`.
    fn wait_for_selector(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ScrapeError>> + Send;

    /// Absolute `href` of every element matching `selector`, in document order.
    fn hrefs(&self, selector: &str) -> impl Future<Output = Result<Vec<String>, ScrapeError>> + Send;

    /// Trimmed text of the first element matching `selector`; `None` if no
    /// element matches or its text is empty.
    fn text(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<String>, ScrapeError>> + Send;

    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Page type produced by a launcher's engine.
pub type PageOf<L> = <<L as BrowserLauncher>::Engine as BrowserEngine>::Page;

/// A named, pre-configured browsing context.
#[derive(Debug)]
pub struct BrowsingContext {
    name: String,
    profile: ContextProfile,
    pages_opened: AtomicUsize,
}

impl BrowsingContext {
    fn new(name: &str, profile: ContextProfile) -> Self {
        Self {
            name: name.to_string(),
            profile,
            pages_opened: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn profile(&self) -> &ContextProfile {
        &self.profile
    }

    /// Pages opened on this context so far.
    pub fn pages_opened(&self) -> usize {
        self.pages_opened.load(Ordering::Relaxed)
    }
}

enum EngineState<E> {
    NotLaunched,
    Running(Arc<E>),
    /// Launch failed; the reason is replayed to every later caller.
    Failed(String),
    ShutDown,
}

/// Shared owner of the browser process and its named contexts.
pub struct BrowserManager<L: BrowserLauncher> {
    launcher: L,
    settings: BrowserConfig,
    profiles: BTreeMap<String, ContextProfile>,
    engine: Mutex<EngineState<L::Engine>>,
    contexts: Mutex<HashMap<String, Arc<BrowsingContext>>>,
}

impl<L: BrowserLauncher> BrowserManager<L> {
    pub fn new(launcher: L, settings: BrowserConfig) -> Self {
        let profiles = settings.contexts.clone();
        Self {
            launcher,
            settings,
            profiles,
            engine: Mutex::new(EngineState::NotLaunched),
            contexts: Mutex::new(HashMap::new()),
        }
    }

    /// Running engine, launching it on first use. The engine lock is held
    /// across the launch so concurrent first callers wait instead of racing.
    async fn engine(&self) -> Result<Arc<L::Engine>, ScrapeError> {
        let mut state = self.engine.lock().await;
        match &*state {
            EngineState::Running(engine) => return Ok(Arc::clone(engine)),
            EngineState::Failed(reason) => return Err(ScrapeError::BrowserLaunch(reason.clone())),
            EngineState::ShutDown => return Err(ScrapeError::BrowserClosed),
            EngineState::NotLaunched => {}
        }

        tracing::info!(headless = self.settings.headless, "launching browser");
        match self.launcher.launch(&self.settings).await {
            Ok(engine) => {
                let engine = Arc::new(engine);
                *state = EngineState::Running(Arc::clone(&engine));
                Ok(engine)
            }
            Err(e) => {
                let reason = match &e {
                    ScrapeError::BrowserLaunch(reason) => reason.clone(),
                    other => other.to_string(),
                };
                tracing::error!("browser launch failed: {}", reason);
                *state = EngineState::Failed(reason.clone());
                Err(ScrapeError::BrowserLaunch(reason))
            }
        }
    }

    /// Context registered under `name`, created on first request.
    pub async fn get_context(&self, name: &str) -> Result<Arc<BrowsingContext>, ScrapeError> {
        self.engine().await?;
        let mut contexts = self.contexts.lock().await;
        if let Some(ctx) = contexts.get(name) {
            return Ok(Arc::clone(ctx));
        }
        let profile = self
            .profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ScrapeError::UnknownContext(name.to_string()))?;
        let ctx = Arc::new(BrowsingContext::new(name, profile));
        contexts.insert(name.to_string(), Arc::clone(&ctx));
        tracing::debug!(context = name, "created browsing context");
        Ok(ctx)
    }

    /// Open a new page on `context_name`. The caller owns the page and must close it.
    pub async fn get_page(&self, context_name: &str) -> Result<PageOf<L>, ScrapeError> {
        let ctx = self.get_context(context_name).await?;
        let engine = self.engine().await?;
        let page = engine.open_page(ctx.profile()).await?;
        ctx.pages_opened.fetch_add(1, Ordering::Relaxed);
        Ok(page)
    }

    /// Names of the contexts created so far.
    pub async fn context_names(&self) -> Vec<String> {
        let contexts = self.contexts.lock().await;
        let mut names: Vec<String> = contexts.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn is_running(&self) -> bool {
        matches!(&*self.engine.lock().await, EngineState::Running(_))
    }

    /// Drop all contexts and stop the browser. Calling it again is a no-op;
    /// page requests after shutdown fail with [`ScrapeError::BrowserClosed`].
    pub async fn shutdown(&self) {
        let mut state = self.engine.lock().await;
        let previous = std::mem::replace(&mut *state, EngineState::ShutDown);
        self.contexts.lock().await.clear();
        if let EngineState::Running(engine) = previous {
            engine.shutdown().await;
            tracing::info!("browser shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{FakeLauncher, FakeSite};
    use super::*;
    use crate::config::DEFAULT_CONTEXT;

    fn manager(site: &Arc<FakeSite>) -> Arc<BrowserManager<FakeLauncher>> {
        Arc::new(BrowserManager::new(
            FakeLauncher::new(Arc::clone(site)),
            BrowserConfig::default(),
        ))
    }

    #[tokio::test]
    async fn concurrent_first_use_launches_once() {
        let site = FakeSite::builder().launch_delay(Duration::from_millis(20)).build();
        let mgr = manager(&site);

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let mgr = Arc::clone(&mgr);
            tasks.spawn(async move { mgr.get_context(DEFAULT_CONTEXT).await.map(|c| c.name().to_string()) });
        }
        while let Some(res) = tasks.join_next().await {
            assert_eq!(res.unwrap().unwrap(), DEFAULT_CONTEXT);
        }
        assert_eq!(site.launches(), 1);
        assert_eq!(mgr.context_names().await, vec![DEFAULT_CONTEXT.to_string()]);
    }

    #[tokio::test]
    async fn context_creation_is_idempotent() {
        let site = FakeSite::builder().build();
        let mgr = manager(&site);
        let a = mgr.get_context(DEFAULT_CONTEXT).await.unwrap();
        let b = mgr.get_context(DEFAULT_CONTEXT).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.profile(), &ContextProfile::default());
    }

    #[tokio::test]
    async fn unknown_context_is_rejected() {
        let site = FakeSite::builder().build();
        let mgr = manager(&site);
        let err = mgr.get_context("mobile").await.unwrap_err();
        assert_eq!(err, ScrapeError::UnknownContext("mobile".to_string()));
    }

    #[tokio::test]
    async fn pages_get_the_context_fingerprint() {
        let site = FakeSite::builder().build();
        let mgr = manager(&site);
        let page = mgr.get_page(DEFAULT_CONTEXT).await.unwrap();
        assert_eq!(page.profile().user_agent, ContextProfile::default().user_agent);
        page.close().await;
        let ctx = mgr.get_context(DEFAULT_CONTEXT).await.unwrap();
        assert_eq!(ctx.pages_opened(), 1);
        assert_eq!(site.open_pages(), 0);
    }

    #[tokio::test]
    async fn launch_failure_is_remembered_and_fatal() {
        let site = FakeSite::builder().fail_launch().build();
        let mgr = manager(&site);
        let first = mgr.get_page(DEFAULT_CONTEXT).await.unwrap_err();
        let second = mgr.get_context(DEFAULT_CONTEXT).await.unwrap_err();
        assert!(matches!(first, ScrapeError::BrowserLaunch(_)));
        assert!(first.is_fatal());
        assert_eq!(first, second);
        assert_eq!(site.launches(), 1);
    }

    #[tokio::test]
    async fn shutdown_is_safe_twice_and_blocks_new_pages() {
        let site = FakeSite::builder().build();
        let mgr = manager(&site);
        mgr.get_context(DEFAULT_CONTEXT).await.unwrap();
        assert!(mgr.is_running().await);

        mgr.shutdown().await;
        mgr.shutdown().await;

        assert_eq!(site.shutdowns(), 1);
        assert!(!mgr.is_running().await);
        assert!(mgr.context_names().await.is_empty());
        let err = mgr.get_page(DEFAULT_CONTEXT).await.unwrap_err();
        assert_eq!(err, ScrapeError::BrowserClosed);
    }

    #[tokio::test]
    async fn shutdown_before_launch_never_starts_a_browser() {
        let site = FakeSite::builder().build();
        let mgr = manager(&site);
        mgr.shutdown().await;
        assert_eq!(site.launches(), 0);
        assert_eq!(site.shutdowns(), 0);
    }
}
