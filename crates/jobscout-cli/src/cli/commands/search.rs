//! `jobscout search` – scrape, score and rank postings.

use anyhow::{Context, Result};
use jobscout_core::browser::chrome::ChromeLauncher;
use jobscout_core::browser::BrowserManager;
use jobscout_core::config::ScoutConfig;
use jobscout_core::pipeline::discover;
use jobscout_core::report;
use jobscout_core::scoring::JobMatchScorer;
use jobscout_core::search_url::SearchQuery;
use jobscout_core::source::{BrowserJobSource, SearchRequest};
use std::path::PathBuf;
use std::sync::Arc;

use super::{preferences, resume_profile};
use crate::cli::render;

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: String,
    pub days: Option<i64>,
    pub min_score: Option<u8>,
    pub limit: Option<usize>,
    pub resume: Option<PathBuf>,
    pub remote_only: bool,
    pub location: Option<String>,
    pub save: bool,
    pub json: bool,
}

pub async fn run_search(cfg: &ScoutConfig, opts: SearchOptions) -> Result<()> {
    let defaults = &cfg.search;
    let prefs = preferences(opts.remote_only, opts.location, defaults);
    let min_score = opts.min_score.unwrap_or(defaults.min_score);
    let request = SearchRequest {
        query: SearchQuery {
            text: opts.query,
            days_window: opts.days.unwrap_or(defaults.days),
            location: prefs.location.clone(),
            remote_only: prefs.remote_only,
        },
        limit: opts.limit.unwrap_or(defaults.limit),
    };
    let profile = resume_profile(opts.resume.as_deref(), defaults);
    let scorer = JobMatchScorer::new(prefs);

    let manager = Arc::new(BrowserManager::new(ChromeLauncher, cfg.browser.clone()));
    let source = BrowserJobSource::new(cfg.site.clone(), &cfg.scraper, &cfg.retry, Arc::clone(&manager))?;
    let outcome = discover(&source, &request, &profile, &scorer, min_score).await;
    manager.shutdown().await;
    let report = outcome.context("search failed")?;

    if opts.json {
        println!("{}", report::to_json(&report)?);
    } else {
        print!("{}", render::report_text(&report));
    }
    if opts.save {
        let path = report::save_report(&report, &report::reports_dir()?)?;
        eprintln!("saved report to {}", path.display());
    }
    Ok(())
}
