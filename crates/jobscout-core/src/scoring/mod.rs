//! Weighted job-match scoring.
//!
//! A posting earns up to 40 points for skill coverage, 25 for meeting the
//! experience requirement, 15 for location fit and up to 20 bonus points.
//! Scoring is pure: the same profile and posting always give the same score.

mod experience;

pub use experience::{required_years, seniority_years};

use thiserror::Error;

use crate::model::{JobMatchScore, JobPosting, Recommendation, ResumeProfile, ScoreBreakdown};
use crate::skills::{extract_job_skills, find_match};
use crate::text::contains_term;

pub const SKILL_WEIGHT: f64 = 40.0;
pub const EXPERIENCE_WEIGHT: f64 = 25.0;
pub const LOCATION_WEIGHT: f64 = 15.0;
pub const MAX_BONUS: f64 = 20.0;

const HIGH_SALARY: u64 = 120_000;
const SALARY_BONUS: f64 = 5.0;
const REMOTE_BONUS: f64 = 5.0;
const EQUITY_BONUS: f64 = 2.0;
const STARTUP_BONUS: f64 = 3.0;
const VISA_BONUS: f64 = 2.0;

const EQUITY_TERMS: &[&str] = &["equity", "stock options", "rsus"];
const STARTUP_TERMS: &[&str] = &["startup", "start-up", "early-stage", "early stage"];
const VISA_TERMS: &[&str] = &["visa sponsorship", "sponsor visas", "sponsorship available"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("invalid job record: {0}")]
    InvalidJobRecord(String),
}

/// What the candidate wants from a job beyond skills and experience.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePreferences {
    pub remote_only: bool,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JobMatchScorer {
    prefs: CandidatePreferences,
}

impl JobMatchScorer {
    pub fn new(prefs: CandidatePreferences) -> Self {
        Self { prefs }
    }

    /// Score `posting`, turning an invalid record into a zero score that
    /// carries the error.
    pub fn score(&self, profile: &ResumeProfile, posting: &JobPosting) -> JobMatchScore {
        match self.try_score(profile, posting) {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!(job = %posting.id, "{e}");
                JobMatchScore::failed(posting.id.clone(), e.to_string())
            }
        }
    }

    pub fn try_score(&self, profile: &ResumeProfile, posting: &JobPosting) -> Result<JobMatchScore, ScoreError> {
        validate(posting)?;

        let required: Vec<String> = extract_job_skills(&posting.description).into_iter().collect();
        let (matched, missing): (Vec<String>, Vec<String>) = required
            .iter()
            .cloned()
            .partition(|skill| find_match(skill, &profile.skills).is_some());
        let skill_points = if required.is_empty() {
            0.0
        } else {
            SKILL_WEIGHT * matched.len() as f64 / required.len() as f64
        };

        let experience_match = experience_ok(profile, posting);
        let location_match = self.location_ok(profile, posting);
        let breakdown = ScoreBreakdown {
            skills: skill_points,
            experience: if experience_match { EXPERIENCE_WEIGHT } else { 0.0 },
            location: if location_match { LOCATION_WEIGHT } else { 0.0 },
            bonus: bonus_points(posting),
        };
        let score = breakdown.total().round().clamp(0.0, 100.0) as u8;

        Ok(JobMatchScore {
            job_id: posting.id.clone(),
            score,
            required_skills: required,
            matched_skills: matched,
            missing_skills: missing,
            experience_match,
            location_match,
            recommendation: Recommendation::from_score(score),
            breakdown,
            error: None,
        })
    }

    /// An explicit preference wins over the location found in the resume.
    fn location_ok(&self, profile: &ResumeProfile, posting: &JobPosting) -> bool {
        if self.prefs.remote_only {
            return posting.is_remote();
        }
        let wanted = [self.prefs.location.as_deref(), profile.location.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|l| !l.is_empty());
        let Some(wanted) = wanted else {
            return true;
        };
        if posting.is_remote() {
            return true;
        }
        let wanted = wanted.to_lowercase();
        // "Denver, CO" also accepts postings that only name the city.
        let city = wanted.split(',').next().unwrap_or(&wanted).trim().to_string();
        [&posting.location, &posting.title, &posting.description]
            .iter()
            .map(|text| text.to_lowercase())
            .any(|text| text.contains(&wanted) || (!city.is_empty() && contains_term(&text, &city)))
    }
}

fn validate(posting: &JobPosting) -> Result<(), ScoreError> {
    if posting.title.trim().is_empty() {
        return Err(ScoreError::InvalidJobRecord("missing title".to_string()));
    }
    if posting.description.trim().is_empty() {
        return Err(ScoreError::InvalidJobRecord("missing description".to_string()));
    }
    Ok(())
}

fn experience_ok(profile: &ResumeProfile, posting: &JobPosting) -> bool {
    let needed = required_years(&posting.description)
        .or_else(|| seniority_years(&posting.title, &posting.description));
    match needed {
        Some(years) => profile.experience_years >= years,
        None => true,
    }
}

fn bonus_points(posting: &JobPosting) -> f64 {
    let text = format!("{}\n{}", posting.title, posting.description).to_lowercase();
    let mentions = |terms: &[&str]| terms.iter().any(|t| contains_term(&text, t));

    let mut bonus = 0.0;
    if posting.salary.as_ref().is_some_and(|s| s.min >= HIGH_SALARY) {
        bonus += SALARY_BONUS;
    }
    if posting.is_remote() {
        bonus += REMOTE_BONUS;
    }
    if mentions(EQUITY_TERMS) {
        bonus += EQUITY_BONUS;
    }
    if mentions(STARTUP_TERMS) {
        bonus += STARTUP_BONUS;
    }
    if mentions(VISA_TERMS) {
        bonus += VISA_BONUS;
    }
    f64::clamp(bonus, 0.0, MAX_BONUS)
}
