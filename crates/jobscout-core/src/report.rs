//! Saving and loading discovery reports.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::JobPosting;
use crate::pipeline::DiscoveryReport;

const MAX_SLUG_LEN: usize = 48;

/// `$XDG_DATA_HOME/jobscout/reports`, created if missing.
pub fn reports_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("jobscout")?;
    Ok(xdg_dirs.create_data_directory("reports")?)
}

/// Lowercase ASCII slug of a query for use in file names.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let slug: String = slug.chars().take(MAX_SLUG_LEN).collect();
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "search".to_string()
    } else {
        slug
    }
}

pub fn to_json(report: &DiscoveryReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write `report` into `dir` as `<utc timestamp>-<query slug>.json`.
pub fn save_report(report: &DiscoveryReport, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let name = format!(
        "{}-{}.json",
        report.generated_at.format("%Y%m%dT%H%M%SZ"),
        slugify(&report.query)
    );
    let path = dir.join(name);
    fs::write(&path, to_json(report)?).with_context(|| format!("write report {}", path.display()))?;
    tracing::info!("saved report to {}", path.display());
    Ok(path)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostingsFile {
    Postings(Vec<JobPosting>),
    Report(Box<DiscoveryReport>),
}

/// Postings from a JSON file holding either an array of postings or a
/// saved discovery report. Reports give every fetched posting; reports
/// saved without that list fall back to their ranked results.
pub fn load_postings(path: &Path) -> Result<Vec<JobPosting>> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let parsed: PostingsFile =
        serde_json::from_str(&data).with_context(|| format!("parse postings {}", path.display()))?;
    Ok(match parsed {
        PostingsFile::Postings(postings) => postings,
        PostingsFile::Report(report) if !report.postings.is_empty() => report.postings,
        PostingsFile::Report(report) => report.results.into_iter().map(|r| r.posting).collect(),
    })
}
