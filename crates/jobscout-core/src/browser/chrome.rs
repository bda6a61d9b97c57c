//! Headless Chrome engine (`headless_chrome`).
//!
//! The DevTools client is blocking, so every call runs on the blocking pool
//! and is bounded by a tokio timeout; a navigation that overruns only fails
//! its own attempt.

use std::sync::Arc;
use std::time::Duration;

use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::{Browser, LaunchOptions, Tab};

use super::{BrowserEngine, BrowserLauncher, Page};
use crate::config::{BrowserConfig, ContextProfile};
use crate::retry::ScrapeError;

/// Chrome is kept alive across inter-batch pauses; this only bounds how long
/// it may sit with no DevTools traffic at all.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Headroom on top of the DevTools timeout before the tokio timeout fires.
const TIMEOUT_GRACE: Duration = Duration::from_secs(2);

/// Run a blocking DevTools call; join failures become [`ScrapeError::Task`].
async fn blocking<T, F>(f: F) -> Result<anyhow::Result<T>, ScrapeError>
where
    T: Send + 'static,
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ScrapeError::Task(format!("devtools task join: {e}")))
}

fn is_timeout(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        let msg = cause.to_string().to_lowercase();
        msg.contains("timed out") || msg.contains("timeout") || msg.contains("never came")
    })
}

/// JS string literal for `s` (JSON strings are valid JS literals).
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

impl BrowserLauncher for ChromeLauncher {
    type Engine = ChromeEngine;

    async fn launch(&self, settings: &BrowserConfig) -> Result<ChromeEngine, ScrapeError> {
        let cfg = settings.clone();
        let launch = blocking(move || {
            let mut builder = LaunchOptions::default_builder();
            builder
                .headless(cfg.headless)
                .window_size(Some((cfg.viewport_width, cfg.viewport_height)))
                .idle_browser_timeout(IDLE_BROWSER_TIMEOUT);
            if let Some(path) = cfg.chrome_path.clone() {
                builder.path(Some(path));
            }
            let options = builder
                .build()
                .map_err(|e| anyhow::anyhow!("invalid launch options: {e}"))?;
            Browser::new(options)
        });

        let limit = Duration::from_secs(settings.launch_timeout_secs.max(1));
        let browser = match tokio::time::timeout(limit, launch).await {
            Err(_) => {
                return Err(ScrapeError::BrowserLaunch(format!(
                    "browser did not start within {}s",
                    limit.as_secs()
                )))
            }
            Ok(joined) => joined
                .map_err(|e| ScrapeError::BrowserLaunch(e.to_string()))?
                .map_err(|e| ScrapeError::BrowserLaunch(format!("{e:#}")))?,
        };

        tracing::info!(
            width = settings.viewport_width,
            height = settings.viewport_height,
            "chrome launched"
        );
        Ok(ChromeEngine {
            browser: Arc::new(browser),
        })
    }
}

pub struct ChromeEngine {
    browser: Arc<Browser>,
}

impl BrowserEngine for ChromeEngine {
    type Page = ChromePage;

    async fn open_page(&self, profile: &ContextProfile) -> Result<ChromePage, ScrapeError> {
        let browser = Arc::clone(&self.browser);
        let profile = profile.clone();
        let tab = blocking(move || {
            let tab = browser.new_tab()?;
            tab.set_user_agent(&profile.user_agent, Some(&profile.locale), None)?;
            tab.call_method(Emulation::SetTimezoneOverride {
                timezone_id: profile.timezone.clone(),
            })?;
            tab.call_method(Emulation::SetLocaleOverride {
                locale: Some(profile.locale.clone()),
            })?;
            Ok(tab)
        })
        .await?
        .map_err(|e| ScrapeError::Navigation {
            url: "about:blank".to_string(),
            reason: format!("open tab: {e:#}"),
        })?;
        Ok(ChromePage { tab })
    }

    async fn shutdown(&self) {
        let browser = Arc::clone(&self.browser);
        let closed = blocking(move || {
            let tabs: Vec<Arc<Tab>> = match browser.get_tabs().lock() {
                Ok(tabs) => tabs.clone(),
                Err(_) => Vec::new(),
            };
            for tab in tabs {
                let _ = tab.close(false);
            }
            Ok(())
        })
        .await;
        if closed.is_err() {
            tracing::warn!("could not close remaining tabs before shutdown");
        }
        // The Chrome process is killed when the last `Browser` handle drops.
    }
}

pub struct ChromePage {
    tab: Arc<Tab>,
}

impl ChromePage {
    async fn evaluate(&self, expression: String) -> Result<Option<serde_json::Value>, ScrapeError> {
        let tab = Arc::clone(&self.tab);
        let result = blocking(move || Ok(tab.evaluate(&expression, false)?.value))
            .await?
            .map_err(|e| ScrapeError::Script(format!("{e:#}")))?;
        Ok(result)
    }
}

impl Page for ChromePage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let tab = Arc::clone(&self.tab);
        let target = url.to_string();
        let nav = blocking(move || {
            tab.set_default_timeout(timeout);
            tab.navigate_to(&target)?;
            tab.wait_until_navigated()?;
            Ok(())
        });

        let timed_out = || ScrapeError::NavigationTimeout {
            url: url.to_string(),
            timeout,
        };
        match tokio::time::timeout(timeout + TIMEOUT_GRACE, nav).await {
            Err(_) => Err(timed_out()),
            Ok(joined) => match joined? {
                Ok(()) => Ok(()),
                Err(e) if is_timeout(&e) => Err(timed_out()),
                Err(e) => Err(ScrapeError::Navigation {
                    url: url.to_string(),
                    reason: format!("{e:#}"),
                }),
            },
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let tab = Arc::clone(&self.tab);
        let sel = selector.to_string();
        let wait = blocking(move || {
            tab.wait_for_element_with_custom_timeout(&sel, timeout)?;
            Ok(())
        });
        let not_found = || ScrapeError::ElementNotFound {
            selector: selector.to_string(),
            url: self.tab.get_url(),
        };
        match tokio::time::timeout(timeout + TIMEOUT_GRACE, wait).await {
            Ok(joined) => joined?.map_err(|_| not_found()),
            Err(_) => Err(not_found()),
        }
    }

    async fn hrefs(&self, selector: &str) -> Result<Vec<String>, ScrapeError> {
        let expression = format!(
            "JSON.stringify(Array.from(document.querySelectorAll({})).map(e => e.href).filter(h => typeof h === 'string' && h.length > 0))",
            js_string(selector)
        );
        let value = self.evaluate(expression).await?;
        let raw = value
            .as_ref()
            .and_then(|v| v.as_str())
            .ok_or_else(|| ScrapeError::Script(format!("href query for {selector} returned nothing")))?;
        serde_json::from_str(raw).map_err(|e| ScrapeError::Script(format!("href list: {e}")))
    }

    async fn text(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        let expression = format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return null; const t = (el.innerText || el.textContent || '').trim(); return t.length ? t : null; }})()",
            js_string(selector)
        );
        let value = self.evaluate(expression).await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_string)))
    }

    async fn close(self) {
        let tab = self.tab;
        if let Ok(Err(e)) = blocking(move || tab.close(true).map(|_| ())).await {
            tracing::debug!("closing tab failed: {e:#}");
        }
    }
}
