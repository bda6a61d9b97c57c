//! Tracing setup for jobscout runs.
//!
//! Runs log to `$XDG_STATE_HOME/jobscout/jobscout.log`, appending across
//! runs. `JOBSCOUT_LOG` (then `RUST_LOG`) overrides the filter. The
//! DevTools client is chatty at debug level, so it is held at `warn` unless
//! asked for explicitly.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "JOBSCOUT_LOG";

pub const DEFAULT_FILTER: &str =
    "info,jobscout=debug,jobscout_core=debug,headless_chrome=warn,tungstenite=warn";

fn filter_from(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn env_filter() -> EnvFilter {
    let directives = std::env::var(LOG_ENV)
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .filter(|d| !d.trim().is_empty());
    filter_from(directives)
}

/// Where `init_logging` writes; the directory is created if missing.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("jobscout")?;
    let path = xdg_dirs
        .place_state_file("jobscout.log")
        .context("create jobscout state directory")?;
    Ok(path)
}

/// Log to the state-dir file. Errors (unwritable directory, subscriber
/// already set) are returned so the CLI can fall back to stderr.
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {e}"))?;

    tracing::info!(path = %path.display(), "jobscout logging initialized");
    Ok(())
}

/// Log to stderr, warnings and up unless a filter is set. Never fails.
pub fn init_logging_stderr() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
