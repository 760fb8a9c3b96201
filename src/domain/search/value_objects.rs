// src/domain/search/value_objects.rs
//
// Metadata search value objects.
//
// Candidates come from a keyword search and only carry enough to render a
// dropdown row. Details come from a second lookup and carry everything a
// movie record needs. Both are immutable snapshots of the remote answer.

use serde::{Deserialize, Serialize};

/// Minimum trimmed query length before a search is issued
pub const MIN_QUERY_CHARS: usize = 2;

/// One row of a keyword search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Metadata API identifier (used for the detail lookup)
    pub id: String,
    pub title: String,
    /// Raw year string, may be a range for series ("2011–2019")
    pub year: String,
    /// "movie", "series", "episode"
    pub kind: String,
    pub poster: Option<String>,
}

/// Full descriptive fields of a single title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub poster: Option<String>,
    pub plot: Option<String>,
    pub genre: Option<String>,
    /// Minutes
    pub runtime: Option<u32>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub rated: Option<String>,
}

/// A query worth sending: trimmed and at least [`MIN_QUERY_CHARS`] long
pub fn normalize_query(raw: &str, min_chars: usize) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().count() < min_chars {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// The metadata API uses the literal "N/A" for missing fields
pub fn available(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "N/A")
}

/// First four-digit run of a year field ("1972", "2011–2019", "2020–")
pub fn parse_year(raw: &str) -> Option<i32> {
    let digits: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.len() == 4 {
        digits.parse().ok()
    } else {
        None
    }
}

/// Minutes from a runtime field such as "175 min"
pub fn parse_runtime(raw: &str) -> Option<u32> {
    raw.split_whitespace().next()?.parse().ok()
}
