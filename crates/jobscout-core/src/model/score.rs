use serde::{Deserialize, Serialize};
use std::fmt;

/// Bucketed reading of a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recommendation {
    StrongFit,
    GoodFit,
    ConditionalFit,
    PoorFit,
}

impl Recommendation {
    /// Tier for a score; lower bounds are inclusive.
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => Recommendation::StrongFit,
            60..=74 => Recommendation::GoodFit,
            45..=59 => Recommendation::ConditionalFit,
            _ => Recommendation::PoorFit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongFit => "strong-fit",
            Recommendation::GoodFit => "good-fit",
            Recommendation::ConditionalFit => "conditional-fit",
            Recommendation::PoorFit => "poor-fit",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Points contributed by each scoring component, before rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
    pub bonus: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.skills + self.experience + self.location + self.bonus
    }
}

/// Result of matching one posting against the resume profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatchScore {
    pub job_id: String,
    pub score: u8,
    /// Skills extracted from the posting; `matched_skills` is a subset.
    pub required_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub experience_match: bool,
    pub location_match: bool,
    pub recommendation: Recommendation,
    pub breakdown: ScoreBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub error: Option<String>,
}

impl JobMatchScore {
    /// Zero score for a posting that could not be evaluated.
    pub fn failed(job_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            score: 0,
            required_skills: Vec::new(),
            matched_skills: Vec::new(),
            missing_skills: Vec::new(),
            experience_match: false,
            location_match: false,
            recommendation: Recommendation::PoorFit,
            breakdown: ScoreBreakdown::default(),
            error: Some(reason.into()),
        }
    }
}
