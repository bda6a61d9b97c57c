use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Defaults for a discovery run; CLI flags override these per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    /// How many days back the search window reaches.
    pub days: i64,
    /// Minimum match score (0–100) a job needs to be reported.
    pub min_score: u8,
    /// Maximum number of detail links collected and results reported.
    pub limit: usize,
    /// Only accept remote positions as location matches.
    pub remote_only: bool,
    /// Preferred location (free text, e.g. "Austin, TX").
    pub location: Option<String>,
    /// Plain-text resume used for scoring.
    pub resume_path: Option<PathBuf>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            days: 14,
            min_score: 35,
            limit: 10,
            remote_only: false,
            location: None,
            resume_path: None,
        }
    }
}

/// Worker pool, pacing and timeouts for the scraper.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Number of detail pages fetched concurrently (K).
    pub concurrency: usize,
    /// Base pause between batches in milliseconds.
    pub base_delay_ms: u64,
    /// Uniform jitter applied to the base pause, as a ratio (0.3 = ±30%).
    pub jitter_ratio: f64,
    /// Multiplier applied to the next pause after a batch saw rate limiting.
    pub throttle_penalty: f64,
    /// Per-navigation timeout in seconds.
    pub navigation_timeout_secs: u64,
    /// Settle time after a detail page loads, in milliseconds.
    pub detail_settle_ms: u64,
    /// Attempts at loading the search results page.
    pub collect_attempts: u32,
    /// Optional wall-clock budget for fetching; no new batch starts after it.
    pub overall_budget_secs: Option<u64>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            concurrency: 3,
            base_delay_ms: 3000,
            jitter_ratio: 0.3,
            throttle_penalty: 2.0,
            navigation_timeout_secs: 30,
            detail_settle_ms: 2000,
            collect_attempts: 3,
            overall_budget_secs: None,
        }
    }
}

impl ScraperConfig {
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs.max(1))
    }

    pub fn overall_budget(&self) -> Option<Duration> {
        self.overall_budget_secs.map(Duration::from_secs)
    }
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per link (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds; attempt N waits N × base.
    pub base_delay_secs: f64,
    /// Extra multiplier on the delay when the site looks like it is rate limiting us.
    pub rate_limit_multiplier: u32,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 2.0,
            rate_limit_multiplier: 3,
            max_delay_secs: 60,
        }
    }
}

/// Fingerprint presented by one named browsing context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextProfile {
    pub user_agent: String,
    pub locale: String,
    pub timezone: String,
}

impl Default for ContextProfile {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            locale: "en-US".to_string(),
            timezone: "America/New_York".to_string(),
        }
    }
}

/// Browser process settings and the named contexts it serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// How long to wait for the browser process to come up.
    pub launch_timeout_secs: u64,
    /// Explicit Chrome/Chromium binary; autodetected when unset.
    pub chrome_path: Option<PathBuf>,
    pub contexts: BTreeMap<String, ContextProfile>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        let mut contexts = BTreeMap::new();
        contexts.insert(DEFAULT_CONTEXT.to_string(), ContextProfile::default());
        Self {
            headless: true,
            viewport_width: 1366,
            viewport_height: 768,
            launch_timeout_secs: 30,
            chrome_path: None,
            contexts,
        }
    }
}

/// Name of the context created by the default configuration.
pub const DEFAULT_CONTEXT: &str = "default";

/// How the collector decides the search page has hydrated.
///
/// With a `selector` the collector waits for it (up to `selector_timeout_ms`)
/// and falls back to the settle delay if it never shows up. Without one the
/// settle delay is the only signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadySignal {
    pub selector: Option<String>,
    pub selector_timeout_ms: u64,
    pub settle_ms: u64,
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self {
            selector: None,
            selector_timeout_ms: 10_000,
            settle_ms: 5_000,
        }
    }
}

/// CSS selector candidates per detail-page field; the first non-empty match wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub title: Vec<String>,
    pub description: Vec<String>,
    pub company: Vec<String>,
    pub location: Vec<String>,
    pub salary: Vec<String>,
    pub date_posted: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        fn list(items: &[&str]) -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        }
        Self {
            title: list(&["h1", "h2"]),
            description: list(&["article", "main", "[class*='description' i]"]),
            company: list(&["[class*='company' i]"]),
            location: list(&["[class*='location' i]"]),
            salary: list(&["[class*='salary' i]", "[class*='compensation' i]"]),
            date_posted: list(&["time", "[class*='posted' i]"]),
        }
    }
}

/// Target-site contract: everything markup-dependent lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Reported as `source` on every posting.
    pub name: String,
    pub base_url: String,
    /// Query parameter carrying the JSON search state.
    pub search_param: String,
    /// Anchors considered by the collector.
    pub link_selector: String,
    /// Regex an absolute href must match to count as a detail page.
    pub detail_link_pattern: String,
    /// Browsing context used for this site.
    pub context: String,
    pub ready: ReadySignal,
    pub selectors: SelectorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "hiring.cafe".to_string(),
            base_url: "https://hiring.cafe/".to_string(),
            search_param: "searchState".to_string(),
            link_selector: "a[href*='/viewjob/']".to_string(),
            detail_link_pattern: "/viewjob/".to_string(),
            context: DEFAULT_CONTEXT.to_string(),
            ready: ReadySignal::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

/// Global configuration loaded from `~/.config/jobscout/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub search: SearchDefaults,
    pub scraper: ScraperConfig,
    pub retry: RetryConfig,
    pub browser: BrowserConfig,
    pub site: SiteConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("jobscout")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScoutConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ScoutConfig::default();
        let toml = to_toml(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Serialize a configuration the way it is written to disk.
pub fn to_toml(cfg: &ScoutConfig) -> Result<String> {
    Ok(toml::to_string_pretty(cfg)?)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<ScoutConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: ScoutConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
