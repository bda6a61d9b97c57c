//! Resume text → [`ResumeProfile`].
//!
//! Extraction never fails. Anything it cannot work out becomes a zero or
//! empty field plus a [`ResumeWarning`], and every warning is logged.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::model::ResumeProfile;
use crate::skills::extract_resume_skills;
use crate::text::collapse_whitespace;

/// Upper bound on plausible years of experience.
const MAX_YEARS: u32 = 60;

/// Something the extractor could not determine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeWarning {
    Unreadable { path: PathBuf, reason: String },
    EmptyText,
    NoSkills,
    NoExperience,
}

impl fmt::Display for ResumeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumeWarning::Unreadable { path, reason } => {
                write!(f, "could not read resume {}: {reason}", path.display())
            }
            ResumeWarning::EmptyText => f.write_str("resume text is empty"),
            ResumeWarning::NoSkills => f.write_str("no skills section found in resume"),
            ResumeWarning::NoExperience => f.write_str("no years of experience found in resume"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeExtraction {
    pub profile: ResumeProfile,
    pub warnings: Vec<ResumeWarning>,
}

fn experience_patterns() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"(?i)\b(\d{1,2})\s*\+\s*(?:years?|yrs?)\b",
            r"(?i)\b(\d{1,2})\s+(?:years?|yrs?)\s+of\s+(?:\w+\s+)?experience\b",
            r"(?i)\b(\d{1,2})\s+(?:years?|yrs?)\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("experience regex is valid"))
        .collect()
    })
}

fn location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^\s*location\s*:[ \t]*(\S.*)$").expect("location regex is valid"))
}

/// Years of experience from the first pattern (in priority order) that matches.
pub fn extract_experience_years(text: &str) -> Option<u32> {
    experience_patterns().iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .filter(|years| *years <= MAX_YEARS)
    })
}

pub fn extract_location(text: &str) -> Option<String> {
    location_re()
        .captures(text)
        .map(|caps| collapse_whitespace(&caps[1]))
        .filter(|loc| !loc.is_empty())
}

/// Build a profile from plain resume text.
pub fn extract_profile(text: &str) -> ResumeExtraction {
    let mut warnings = Vec::new();
    if text.trim().is_empty() {
        warnings.push(ResumeWarning::EmptyText);
        return finish(ResumeProfile::default(), warnings);
    }

    let skills = extract_resume_skills(text);
    if skills.is_empty() {
        warnings.push(ResumeWarning::NoSkills);
    }
    let experience_years = extract_experience_years(text).unwrap_or_else(|| {
        warnings.push(ResumeWarning::NoExperience);
        0
    });

    let profile = ResumeProfile {
        skills,
        experience_years,
        location: extract_location(text),
        raw_text: text.to_string(),
    };
    finish(profile, warnings)
}

/// Read a plain-text resume from disk. Unreadable files give an empty
/// profile with an [`ResumeWarning::Unreadable`] warning.
pub fn load_profile(path: &Path) -> ResumeExtraction {
    match std::fs::read(path) {
        Ok(bytes) => extract_profile(&String::from_utf8_lossy(&bytes)),
        Err(e) => finish(
            ResumeProfile::default(),
            vec![ResumeWarning::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }],
        ),
    }
}

fn finish(profile: ResumeProfile, warnings: Vec<ResumeWarning>) -> ResumeExtraction {
    for warning in &warnings {
        tracing::warn!("{warning}");
    }
    tracing::debug!(
        skills = profile.skills.len(),
        years = profile.experience_years,
        location = ?profile.location,
        "resume profile extracted"
    );
    ResumeExtraction { profile, warnings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const RESUME: &str = "Alex Kim\nLocation: Denver, CO\nSenior engineer with 5+ years building cloud systems.\n\nSkills: Python, AWS, Kubernetes\n";

    #[test]
    fn extracts_all_fields() {
        let out = extract_profile(RESUME);
        assert!(out.warnings.is_empty());
        assert_eq!(out.profile.experience_years, 5);
        assert_eq!(out.profile.location.as_deref(), Some("Denver, CO"));
        assert_eq!(
            out.profile.skills.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["aws", "kubernetes", "python"]
        );
        assert_eq!(out.profile.raw_text, RESUME);
    }

    #[test]
    fn experience_patterns_in_priority_order() {
        assert_eq!(extract_experience_years("2 years at Foo, 7+ years total"), Some(7));
        assert_eq!(extract_experience_years("I have 4 years of professional experience"), Some(4));
        assert_eq!(extract_experience_years("3 years at Initech"), Some(3));
        assert_eq!(extract_experience_years("since 2019"), None);
    }

    #[test]
    fn missing_sections_produce_warnings_not_errors() {
        let out = extract_profile("Just a short bio.");
        assert_eq!(out.profile.experience_years, 0);
        assert!(out.profile.skills.is_empty());
        assert_eq!(out.warnings, vec![ResumeWarning::NoSkills, ResumeWarning::NoExperience]);

        let out = extract_profile("   ");
        assert!(out.profile.is_empty());
        assert_eq!(out.warnings, vec![ResumeWarning::EmptyText]);
    }

    #[test]
    fn loads_from_file_and_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(RESUME.as_bytes())
            .unwrap();
        assert_eq!(load_profile(&path).profile.experience_years, 5);

        let missing = load_profile(&dir.path().join("nope.txt"));
        assert!(missing.profile.is_empty());
        assert!(matches!(missing.warnings[0], ResumeWarning::Unreadable { .. }));
    }
}
