//! Detail-page field extraction.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use super::FetchSettings;
use crate::browser::Page;
use crate::model::{job_id_from_url, JobPosting, LocationType, Salary};
use crate::retry::ScrapeError;
use crate::text::{clean_multiline, collapse_whitespace, contains_term};

/// Phrases that only show up on block / captcha interstitials.
const BLOCK_MARKERS: &[&str] = &[
    "too many requests",
    "rate limit exceeded",
    "you have been rate limited",
    "unusual traffic",
    "verify you are human",
    "are you a robot",
    "captcha",
    "access denied",
    "just a moment",
];

const REMOTE_TERMS: &[&str] = &[
    "remote",
    "work from home",
    "wfh",
    "work from anywhere",
    "distributed team",
];
const HYBRID_TERMS: &[&str] = &["hybrid"];
const ONSITE_TERMS: &[&str] = &["on-site", "onsite", "on site", "in-office", "in office"];

/// Salaries below this are hourly rates or noise, not annual figures.
const MIN_ANNUAL_AMOUNT: u64 = 1_000;

/// Navigate `page` to `url` and build a posting from it.
pub(crate) async fn extract_posting<P: Page>(
    page: &P,
    url: &str,
    settings: &FetchSettings,
) -> Result<JobPosting, ScrapeError> {
    page.goto(url, settings.navigation_timeout).await?;
    if !settings.detail_settle.is_zero() {
        tokio::time::sleep(settings.detail_settle).await;
    }

    let selectors = &settings.selectors;
    let title = first_text(page, &selectors.title).await?.map(|t| collapse_whitespace(&t));
    let description = first_text(page, &selectors.description)
        .await?
        .map(|d| clean_multiline(&d));

    if title.as_deref().is_some_and(looks_blocked) {
        return Err(ScrapeError::SuspectedRateLimit { url: url.to_string() });
    }
    let (title, description) = match (title, description) {
        (Some(title), Some(description)) => (title, description),
        (title, _) => {
            let body = page.text("body").await?.unwrap_or_default();
            if looks_blocked(&body) {
                return Err(ScrapeError::SuspectedRateLimit { url: url.to_string() });
            }
            let missing = if title.is_none() {
                &selectors.title
            } else {
                &selectors.description
            };
            return Err(ScrapeError::ElementNotFound {
                selector: missing.join(", "),
                url: url.to_string(),
            });
        }
    };

    let company = first_text(page, &selectors.company).await?.map(|t| collapse_whitespace(&t));
    let location = first_text(page, &selectors.location).await?.map(|t| collapse_whitespace(&t));
    let salary_text = first_text(page, &selectors.salary).await?;
    let date_posted = first_text(page, &selectors.date_posted).await?.map(|t| collapse_whitespace(&t));

    let company = company.unwrap_or_default();
    let location = location.unwrap_or_default();
    let salary = salary_text
        .as_deref()
        .and_then(parse_salary)
        .or_else(|| parse_salary(&description));
    let location_types = infer_location_types(&[&title, &location, &description]);

    Ok(JobPosting {
        id: job_id_from_url(url),
        title,
        company,
        location,
        location_types,
        description,
        salary,
        url: url.to_string(),
        date_posted,
        source: settings.source.clone(),
        scraped_at: Utc::now(),
    })
}

/// Text of the first selector that yields something.
async fn first_text<P: Page>(page: &P, selectors: &[String]) -> Result<Option<String>, ScrapeError> {
    for selector in selectors {
        if let Some(text) = page.text(selector).await? {
            return Ok(Some(text));
        }
    }
    Ok(None)
}

fn looks_blocked(text: &str) -> bool {
    let lower = text.to_lowercase();
    BLOCK_MARKERS.iter().any(|m| lower.contains(m))
}

/// Workplace arrangements mentioned anywhere in `texts`.
pub fn infer_location_types(texts: &[&str]) -> BTreeSet<LocationType> {
    let haystack = texts.join("\n").to_lowercase();
    let mentions = |terms: &[&str]| terms.iter().any(|t| contains_term(&haystack, t));

    let mut types = BTreeSet::new();
    if mentions(REMOTE_TERMS) {
        types.insert(LocationType::Remote);
    }
    if mentions(HYBRID_TERMS) {
        types.insert(LocationType::Hybrid);
    }
    if mentions(ONSITE_TERMS) {
        types.insert(LocationType::Onsite);
    }
    types
}

fn salary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([$€£])\s?(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s?(k)?\b")
            .expect("salary regex is valid")
    })
}

/// First salary figure or range in `text`, e.g. "$120k - $150k" or
/// "€90,000". A single figure gives `min == max`.
pub fn parse_salary(text: &str) -> Option<Salary> {
    let mut currency = None;
    let mut amounts = Vec::with_capacity(2);
    for caps in salary_re().captures_iter(text) {
        let symbol = &caps[1];
        let number: f64 = caps[2].replace(',', "").parse().ok()?;
        let amount = if caps.get(3).is_some() { number * 1_000.0 } else { number };
        let amount = amount.round() as u64;
        if amount < MIN_ANNUAL_AMOUNT {
            continue;
        }
        let code = match symbol {
            "€" => "EUR",
            "£" => "GBP",
            _ => "USD",
        };
        match currency {
            None => currency = Some(code),
            Some(c) if c != code => break,
            Some(_) => {}
        }
        amounts.push(amount);
        if amounts.len() == 2 {
            break;
        }
    }
    let first = *amounts.first()?;
    let last = *amounts.last()?;
    Some(Salary {
        min: first.min(last),
        max: first.max(last),
        currency: currency?.to_string(),
    })
}
