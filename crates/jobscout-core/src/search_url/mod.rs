//! Search URL construction.
//!
//! The target site keeps its whole search state (query, date window,
//! filters) as one JSON object in a single query parameter. Building it is
//! pure: same input, same URL.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// What the user is looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// How many days back postings may have been fetched.
    pub days_window: i64,
    pub location: Option<String>,
    pub remote_only: bool,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, days_window: i64) -> Self {
        Self {
            text: text.into(),
            days_window,
            location: None,
            remote_only: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchUrlError {
    #[error("search query is empty")]
    EmptyQuery,
    #[error("days window must not be negative (got {0})")]
    NegativeDays(i64),
    #[error("invalid site base URL {base}: {reason}")]
    InvalidBase { base: String, reason: String },
}

/// JSON search state for `query`. Keys come out sorted (serde_json's default
/// map), which keeps the encoded URL deterministic.
pub fn search_state(query: &SearchQuery) -> Result<Value, SearchUrlError> {
    let text = query.text.trim();
    if text.is_empty() {
        return Err(SearchUrlError::EmptyQuery);
    }
    if query.days_window < 0 {
        return Err(SearchUrlError::NegativeDays(query.days_window));
    }

    let mut state = Map::new();
    state.insert("searchQuery".to_string(), json!(text));
    state.insert("dateFetchedPastNDays".to_string(), json!(query.days_window));
    if let Some(location) = query
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        state.insert("locationSearch".to_string(), json!(location));
    }
    if query.remote_only {
        state.insert("workplaceTypes".to_string(), json!(["Remote"]));
    }
    Ok(Value::Object(state))
}

/// Build the search-results URL: `base_url?<param>=<url-encoded search state>`.
pub fn build_search_url(
    base_url: &str,
    param: &str,
    query: &SearchQuery,
) -> Result<String, SearchUrlError> {
    let state = search_state(query)?;
    let mut url = url::Url::parse(base_url).map_err(|e| SearchUrlError::InvalidBase {
        base: base_url.to_string(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut()
        .clear()
        .append_pair(param, &state.to_string());
    Ok(url.to_string())
}
