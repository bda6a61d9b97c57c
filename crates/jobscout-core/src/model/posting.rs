use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fmt;

/// Where the work happens, as inferred from posting text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    Remote,
    Hybrid,
    Onsite,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocationType::Remote => "remote",
            LocationType::Hybrid => "hybrid",
            LocationType::Onsite => "onsite",
        };
        f.write_str(s)
    }
}

/// Advertised pay range. A single advertised figure is stored as `min == max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    pub min: u64,
    pub max: u64,
    pub currency: String,
}

/// One job posting as extracted from a detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub location_types: BTreeSet<LocationType>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub salary: Option<Salary>,
    pub url: String,
    #[serde(default)]
    pub date_posted: Option<String>,
    #[serde(default)]
    pub source: String,
    pub scraped_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn is_remote(&self) -> bool {
        self.location_types.contains(&LocationType::Remote)
    }
}

/// Stable job id: first 16 hex chars of SHA-256 over the URL with its
/// fragment and trailing slash removed.
pub fn job_id_from_url(url: &str) -> String {
    let trimmed = url.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);
    let normalized = without_fragment.trim_end_matches('/');
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(digest)[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_stable_and_ignores_fragment() {
        let a = job_id_from_url("https://hiring.cafe/viewjob/abc123");
        let b = job_id_from_url("https://hiring.cafe/viewjob/abc123/#apply");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert_ne!(a, job_id_from_url("https://hiring.cafe/viewjob/abc124"));
    }

    #[test]
    fn posting_json_uses_camel_case_and_tolerates_missing_text() {
        let json = r#"{
            "id": "x",
            "url": "https://hiring.cafe/viewjob/x",
            "locationTypes": ["remote"],
            "scrapedAt": "2026-01-05T10:00:00Z"
        }"#;
        let posting: JobPosting = serde_json::from_str(json).unwrap();
        assert!(posting.description.is_empty());
        assert!(posting.is_remote());
        let out = serde_json::to_string(&posting).unwrap();
        assert!(out.contains("\"scrapedAt\""));
        assert!(out.contains("\"locationTypes\":[\"remote\"]"));
    }
}
