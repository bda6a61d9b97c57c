//! `jobscout rank` – score saved postings offline.

use anyhow::Result;
use jobscout_core::config::ScoutConfig;
use jobscout_core::pipeline::rank_postings;
use jobscout_core::report::load_postings;
use jobscout_core::scoring::JobMatchScorer;
use std::path::PathBuf;

use super::{preferences, resume_profile};
use crate::cli::render;

#[derive(Debug, Clone)]
pub struct RankOptions {
    pub postings: PathBuf,
    pub resume: Option<PathBuf>,
    pub min_score: Option<u8>,
    pub limit: Option<usize>,
    pub remote_only: bool,
    pub location: Option<String>,
    pub json: bool,
}

pub fn run_rank(cfg: &ScoutConfig, opts: RankOptions) -> Result<()> {
    let defaults = &cfg.search;
    let postings = load_postings(&opts.postings)?;
    let total = postings.len();
    let profile = resume_profile(opts.resume.as_deref(), defaults);
    let scorer = JobMatchScorer::new(preferences(opts.remote_only, opts.location, defaults));

    let ranking = rank_postings(
        postings,
        &profile,
        &scorer,
        opts.min_score.unwrap_or(defaults.min_score),
        opts.limit.unwrap_or(defaults.limit),
    );

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&render::ranking_json(total, &ranking))?);
    } else {
        print!("{}", render::results_table(&ranking.ranked));
        println!("{}", render::counts_line(&render::ranking_counts(total, &ranking)));
    }
    Ok(())
}
