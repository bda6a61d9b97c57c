//! Skill extraction and matching shared by resume and posting analysis.
//!
//! Skills come from lines introduced by section markers ("Skills:",
//! "Requirements:", ...) split into short normalized tokens, plus, for job
//! descriptions, a word-bounded scan for the built-in vocabulary. Members
//! of a synonym group are reported under one canonical name.

mod vocabulary;

pub use vocabulary::{are_synonyms, canonical_skill, synonym_group, AMBIGUOUS_TERMS, VOCABULARY};

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::text::{collapse_whitespace, contains_term, starts_sentence, term_positions};

/// Section markers recognised in resumes.
pub const RESUME_MARKERS: &[&str] = &[
    "technical skills",
    "skills",
    "skill",
    "technologies",
    "technology",
    "tools",
    "expertise",
    "proficient in",
    "experience with",
    "tech stack",
];

/// Extra section markers recognised in job descriptions.
pub const JOB_MARKERS: &[&str] = &[
    "requirements",
    "qualifications",
    "must have",
    "must haves",
    "must-have",
    "nice to have",
    "nice-to-have",
    "required skills",
    "preferred skills",
];

const MAX_SKILL_WORDS: usize = 4;
const MAX_SKILL_CHARS: usize = 40;
/// Shorter sides than this never match by substring.
const MIN_SUBSTRING_LEN: usize = 3;

const LEADING_FILLERS: &[&str] = &[
    "experience with ",
    "experience in ",
    "knowledge of ",
    "proficiency in ",
    "proficiency with ",
    "familiarity with ",
    "strong ",
    "solid ",
];

/// Which rule made two skills match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchKind {
    Exact,
    Synonym,
    Substring,
}

fn marker_re(markers: &[&str]) -> Regex {
    let alternatives = markers
        .iter()
        .map(|m| regex::escape(m))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)(?:^|[^a-z])(?:{alternatives})\s*:[ \t]*(.*)$"))
        .expect("marker regex is valid")
}

fn resume_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| marker_re(RESUME_MARKERS))
}

fn job_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let all: Vec<&str> = RESUME_MARKERS.iter().chain(JOB_MARKERS).copied().collect();
        marker_re(&all)
    })
}

fn splitter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[,;•|()\[\]]|\.\s+|\s+and\s+|\s+&\s+|\s+or\s+").expect("splitter regex is valid")
    })
}

fn years_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d+\s*\+?\s*(?:years?|yrs?)\.?\s*(?:of\s+)?(?:(?:professional|hands-on)\s+)?(?:experience\s+)?(?:(?:with|in|using)\s+)?")
            .expect("years prefix regex is valid")
    })
}

fn is_bullet_line(line: &str) -> bool {
    matches!(line.trim_start().chars().next(), Some('-' | '*' | '•' | '·'))
}

/// Raw text following every section marker in `text`. A marker with
/// nothing after the colon takes the bullet list on the following lines.
fn section_payloads(text: &str, marker: &Regex) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let mut payloads = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(caps) = marker.captures(lines[i]) else {
            i += 1;
            continue;
        };
        let rest = caps.get(1).map_or("", |m| m.as_str()).trim();
        if !rest.is_empty() {
            payloads.push(rest.to_string());
            i += 1;
            continue;
        }
        i += 1;
        while i < lines.len() && is_bullet_line(lines[i]) {
            payloads.push(lines[i].to_string());
            i += 1;
        }
    }
    payloads
}

/// Normalize one raw skill phrase: lowercase, trimmed, experience prefixes
/// and filler words removed. `None` when nothing skill-like remains.
pub fn normalize_skill(raw: &str) -> Option<String> {
    let mut skill = collapse_whitespace(&raw.to_lowercase());
    skill = skill
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '*' | '•' | '·' | '.' | ':' | '"' | '\'' | '!'))
        .to_string();
    skill = years_prefix_re().replace(&skill, "").into_owned();
    for filler in LEADING_FILLERS {
        if let Some(stripped) = skill.strip_prefix(filler) {
            skill = stripped.to_string();
        }
    }
    let skill = skill.trim().to_string();

    let words = skill.split_whitespace().count();
    if skill.is_empty()
        || words > MAX_SKILL_WORDS
        || skill.chars().count() > MAX_SKILL_CHARS
        || !skill.chars().any(char::is_alphabetic)
    {
        return None;
    }
    Some(skill)
}

/// Split a marker payload into normalized skills.
pub fn split_skill_list(payload: &str) -> Vec<String> {
    splitter_re()
        .split(payload)
        .filter_map(normalize_skill)
        .collect()
}

/// Skills listed under resume section markers.
pub fn extract_resume_skills(text: &str) -> BTreeSet<String> {
    section_payloads(text, resume_marker_re())
        .iter()
        .flat_map(|payload| split_skill_list(payload))
        .collect()
}

/// Vocabulary terms mentioned anywhere in `text`, by canonical name.
/// Ambiguous terms need one of their technical spellings mid-sentence.
pub fn scan_vocabulary(text: &str) -> BTreeSet<String> {
    let lower = text.to_lowercase();
    let plain = VOCABULARY.iter().filter(|term| contains_term(&lower, term)).copied();
    let ambiguous = AMBIGUOUS_TERMS
        .iter()
        .filter(|(_, spellings)| {
            spellings.iter().any(|spelling| {
                term_positions(text, spelling).any(|offset| !starts_sentence(text, offset))
            })
        })
        .map(|(term, _)| *term);
    plain
        .chain(ambiguous)
        .map(|term| canonical_skill(term).to_string())
        .collect()
}

/// Skills a posting asks for: marker sections plus vocabulary hits, with
/// synonyms folded together.
pub fn extract_job_skills(description: &str) -> BTreeSet<String> {
    let mut skills: BTreeSet<String> = section_payloads(description, job_marker_re())
        .iter()
        .flat_map(|payload| split_skill_list(payload))
        .map(|skill| canonical_skill(&skill).to_string())
        .collect();
    skills.extend(scan_vocabulary(description));
    skills
}

/// How `a` and `b` match, trying exact, synonym and substring rules in
/// that order. Symmetric in its arguments.
pub fn skills_match(a: &str, b: &str) -> Option<MatchKind> {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return None;
    }
    if a == b {
        return Some(MatchKind::Exact);
    }
    if are_synonyms(&a, &b) {
        return Some(MatchKind::Synonym);
    }
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (&a, &b)
    } else {
        (&b, &a)
    };
    if short.chars().count() >= MIN_SUBSTRING_LEN && long.contains(short.as_str()) {
        return Some(MatchKind::Substring);
    }
    None
}

/// Best resume skill for `job_skill`: any exact match beats any synonym,
/// which beats any substring match.
pub fn find_match<'a>(job_skill: &str, resume_skills: &'a BTreeSet<String>) -> Option<(&'a str, MatchKind)> {
    resume_skills
        .iter()
        .filter_map(|r| skills_match(job_skill, r).map(|kind| (r.as_str(), kind)))
        .min_by_key(|(_, kind)| *kind)
}
