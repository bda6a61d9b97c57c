//! Filter, rank and truncate scored postings.

use serde::{Deserialize, Serialize};

use crate::model::{JobMatchScore, JobPosting};

/// A posting together with its match score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedJob {
    pub posting: JobPosting,
    #[serde(rename = "match")]
    pub score: JobMatchScore,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregated {
    pub ranked: Vec<RankedJob>,
    /// Items dropped for scoring under the minimum.
    pub below_minimum: usize,
}

/// Drop items scoring under `min_score`, sort the rest by score (highest
/// first, ties in input order) and keep at most `limit`.
pub fn aggregate(items: Vec<RankedJob>, min_score: u8, limit: usize) -> Aggregated {
    let total = items.len();
    let mut ranked: Vec<RankedJob> = items
        .into_iter()
        .filter(|item| item.score.score >= min_score)
        .collect();
    let below_minimum = total - ranked.len();
    // `sort_by` is stable.
    ranked.sort_by(|a, b| b.score.score.cmp(&a.score.score));
    ranked.truncate(limit);
    Aggregated { ranked, below_minimum }
}
