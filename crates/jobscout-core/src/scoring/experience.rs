use std::sync::OnceLock;

use regex::Regex;

use crate::text::contains_term;

/// Seniority keywords and the years they imply, strictest first.
const SENIORITY: &[(&str, u32)] = &[("director", 10), ("lead", 7), ("senior", 5)];

fn requirement_patterns() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"(?i)\b(\d{1,2})\s*\+\s*(?:years?|yrs?)\b",
            r"(?i)\bminimum\s+(?:of\s+)?(\d{1,2})\s+(?:years?|yrs?)\b",
            r"(?i)\bat\s+least\s+(\d{1,2})\s+(?:years?|yrs?)\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("requirement regex is valid"))
        .collect()
    })
}

/// Years a description explicitly asks for, from the first pattern that matches.
pub fn required_years(description: &str) -> Option<u32> {
    requirement_patterns()
        .iter()
        .find_map(|re| re.captures(description).and_then(|caps| caps[1].parse().ok()))
}

/// Years implied by seniority keywords in the title or description.
pub fn seniority_years(title: &str, description: &str) -> Option<u32> {
    let text = format!("{title}\n{description}").to_lowercase();
    SENIORITY
        .iter()
        .find(|(keyword, _)| contains_term(&text, keyword))
        .map(|(_, years)| *years)
}
