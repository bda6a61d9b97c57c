//! CLI for the jobscout job discovery pipeline.

mod commands;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use jobscout_core::config;
use std::path::PathBuf;

use commands::{run_config, run_rank, run_search, RankOptions, SearchOptions};

/// Top-level CLI for jobscout.
#[derive(Debug, Parser)]
#[command(name = "jobscout")]
#[command(about = "jobscout: find job postings and rank them against your resume", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Search the configured site, fetch postings and rank them.
    Search {
        /// Free-text search query.
        query: String,
        /// Only postings fetched in the last N days (default from config).
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        days: Option<i64>,
        /// Drop results scoring below this (0-100).
        #[arg(long, value_name = "SCORE", value_parser = clap::value_parser!(u8).range(0..=100))]
        min_score: Option<u8>,
        /// Fetch and return at most N postings.
        #[arg(long, value_name = "N", value_parser = positive_limit)]
        limit: Option<usize>,
        /// Plain-text resume to score against.
        #[arg(long, value_name = "PATH")]
        resume: Option<PathBuf>,
        /// Only remote postings count as a location match.
        #[arg(long)]
        remote_only: bool,
        /// Preferred location.
        #[arg(long)]
        location: Option<String>,
        /// Save the JSON report under the data directory.
        #[arg(long)]
        save: bool,
        /// Print the JSON report instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Rank previously saved postings without launching a browser.
    Rank {
        /// JSON file: an array of postings or a saved report (every posting
        /// the search fetched is re-ranked, not only its shortlist).
        postings: PathBuf,
        /// Plain-text resume to score against.
        #[arg(long, value_name = "PATH")]
        resume: Option<PathBuf>,
        /// Drop results scoring below this (0-100).
        #[arg(long, value_name = "SCORE", value_parser = clap::value_parser!(u8).range(0..=100))]
        min_score: Option<u8>,
        /// Return at most N postings.
        #[arg(long, value_name = "N", value_parser = positive_limit)]
        limit: Option<usize>,
        /// Only remote postings count as a location match.
        #[arg(long)]
        remote_only: bool,
        /// Preferred location.
        #[arg(long)]
        location: Option<String>,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file location and effective settings.
    Config,
}

fn positive_limit(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Search {
                query,
                days,
                min_score,
                limit,
                resume,
                remote_only,
                location,
                save,
                json,
            } => {
                let opts = SearchOptions {
                    query,
                    days,
                    min_score,
                    limit,
                    resume,
                    remote_only,
                    location,
                    save,
                    json,
                };
                run_search(&cfg, opts).await?;
            }
            CliCommand::Rank {
                postings,
                resume,
                min_score,
                limit,
                remote_only,
                location,
                json,
            } => {
                let opts = RankOptions {
                    postings,
                    resume,
                    min_score,
                    limit,
                    remote_only,
                    location,
                    json,
                };
                run_rank(&cfg, opts)?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
