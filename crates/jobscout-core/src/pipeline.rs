//! End-to-end discovery: search a source, score, rank.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregate, RankedJob};
use crate::fetcher::SkippedLink;
use crate::model::{JobPosting, ResumeProfile};
use crate::scoring::JobMatchScorer;
use crate::source::{JobSource, SearchRequest, SourceError};

/// How many items reached each stage of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounts {
    pub links_found: usize,
    pub fetched: usize,
    pub skipped: usize,
    pub not_scheduled: usize,
    pub retried: usize,
    pub scoring_errors: usize,
    pub below_minimum: usize,
    pub returned: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryReport {
    pub query: String,
    pub source: String,
    pub search_url: String,
    pub generated_at: DateTime<Utc>,
    pub min_score: u8,
    /// The search page listed no job links at all.
    pub no_results: bool,
    pub counts: RunCounts,
    pub results: Vec<RankedJob>,
    #[serde(default)]
    pub skipped: Vec<SkippedLink>,
    /// Every fetched posting in fetch order, including those cut by the
    /// minimum score or the limit, so a saved report can be re-ranked.
    #[serde(default)]
    pub postings: Vec<JobPosting>,
}

/// Scored and ranked postings plus the counts that go with them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub ranked: Vec<RankedJob>,
    pub scoring_errors: usize,
    pub below_minimum: usize,
}

/// Score every posting and keep the best `limit` at or above `min_score`.
pub fn rank_postings(
    postings: Vec<JobPosting>,
    profile: &ResumeProfile,
    scorer: &JobMatchScorer,
    min_score: u8,
    limit: usize,
) -> Ranking {
    let scored: Vec<RankedJob> = postings
        .into_iter()
        .map(|posting| {
            let score = scorer.score(profile, &posting);
            RankedJob { posting, score }
        })
        .collect();
    let scoring_errors = scored.iter().filter(|r| r.score.error.is_some()).count();
    let aggregated = aggregate(scored, min_score, limit);
    Ranking {
        ranked: aggregated.ranked,
        scoring_errors,
        below_minimum: aggregated.below_minimum,
    }
}

/// Run `source` for `request` and rank what it returns against `profile`.
pub async fn discover<S: JobSource>(
    source: &S,
    request: &SearchRequest,
    profile: &ResumeProfile,
    scorer: &JobMatchScorer,
    min_score: u8,
) -> Result<DiscoveryReport, SourceError> {
    let outcome = source.search(request).await?;
    let no_results = outcome.links_found == 0;
    if no_results {
        tracing::warn!(query = %request.query.text, "no job links found");
    }

    let fetched = outcome.postings.len();
    let ranking = rank_postings(outcome.postings.clone(), profile, scorer, min_score, request.limit);
    let counts = RunCounts {
        links_found: outcome.links_found,
        fetched,
        skipped: outcome.skipped.len(),
        not_scheduled: outcome.not_scheduled,
        retried: outcome.retried,
        scoring_errors: ranking.scoring_errors,
        below_minimum: ranking.below_minimum,
        returned: ranking.ranked.len(),
    };
    tracing::info!(?counts, "discovery finished");

    Ok(DiscoveryReport {
        query: request.query.text.clone(),
        source: source.name().to_string(),
        search_url: outcome.search_url,
        generated_at: Utc::now(),
        min_score,
        no_results,
        counts,
        results: ranking.ranked,
        skipped: outcome.skipped,
        postings: outcome.postings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search_url::SearchQuery;
    use crate::source::SearchOutcome;
    use std::collections::BTreeSet;

    struct CannedSource(SearchOutcome);

    impl JobSource for CannedSource {
        fn name(&self) -> &str {
            "canned"
        }

        async fn search(&self, _request: &SearchRequest) -> Result<SearchOutcome, SourceError> {
            Ok(self.0.clone())
        }
    }

    fn posting(id: &str, title: &str, description: &str) -> JobPosting {
        JobPosting {
            id: id.to_string(),
            title: title.to_string(),
            company: String::new(),
            location: String::new(),
            location_types: BTreeSet::new(),
            description: description.to_string(),
            salary: None,
            url: format!("https://jobs.example/{id}"),
            date_posted: None,
            source: "canned".to_string(),
            scraped_at: Utc::now(),
        }
    }

    fn request() -> SearchRequest {
        SearchRequest {
            query: SearchQuery::new("rust", 14),
            limit: 10,
        }
    }

    fn resume() -> ResumeProfile {
        ResumeProfile {
            skills: ["rust".to_string()].into_iter().collect(),
            experience_years: 4,
            ..ResumeProfile::default()
        }
    }

    #[tokio::test]
    async fn zero_links_is_flagged_not_failed() {
        let source = CannedSource(SearchOutcome::default());
        let report = discover(&source, &request(), &resume(), &JobMatchScorer::default(), 35)
            .await
            .unwrap();
        assert!(report.no_results);
        assert!(report.results.is_empty());
        assert_eq!(report.counts, RunCounts::default());
    }

    #[tokio::test]
    async fn counts_cover_every_stage() {
        let outcome = SearchOutcome {
            search_url: "https://jobs.example/?q".to_string(),
            links_found: 4,
            postings: vec![
                posting("a", "Rust Engineer", "Requirements: Rust"),
                posting("b", "", "broken record"),
                posting("c", "Java Engineer", "Requirements: Java, Spring, Kafka\nSenior role, minimum of 9 years"),
            ],
            skipped: vec![SkippedLink {
                url: "https://jobs.example/d".to_string(),
                error: "navigation timed out".to_string(),
                attempts: 3,
            }],
            not_scheduled: 0,
            retried: 1,
        };
        let report = discover(&CannedSource(outcome), &request(), &resume(), &JobMatchScorer::default(), 35)
            .await
            .unwrap();

        assert!(!report.no_results);
        assert_eq!(report.source, "canned");
        assert_eq!(report.counts.links_found, 4);
        assert_eq!(report.counts.fetched, 3);
        assert_eq!(report.counts.skipped, 1);
        assert_eq!(report.counts.retried, 1);
        assert_eq!(report.counts.scoring_errors, 1);
        assert_eq!(report.counts.below_minimum, 2);
        assert_eq!(report.counts.returned, 1);
        assert_eq!(report.results[0].posting.id, "a");
        let kept: Vec<&str> = report.postings.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(kept, vec!["a", "b", "c"]);
    }
}
