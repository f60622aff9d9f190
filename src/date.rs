//! Permissive date parsing for the listing sort.
//!
//! Strategies are tried in order and the first that succeeds wins. Month-first
//! shapes precede day-first ones, so `03/04/2025` is March 4th while
//! `25/04/2025` still parses as April 25th.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

type Strategy = fn(&str) -> Option<NaiveDateTime>;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

const STRATEGIES: &[Strategy] = &[rfc3339, datetime_shapes, date_shapes, ordinal_day];

fn rfc3339(text: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.naive_utc())
}

fn datetime_shapes(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

fn date_shapes(text: &str) -> Option<NaiveDateTime> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn ordinal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid ordinal pattern"))
}

/// `27th Aug 2025`, `1st January 2024`.
fn ordinal_day(text: &str) -> Option<NaiveDateTime> {
    if !ordinal_re().is_match(text) {
        return None;
    }
    let stripped = ordinal_re().replace(text, "$1");
    date_shapes(&stripped)
}

/// Best-effort parse. Returns `None` for empty or unrecognized text.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    STRATEGIES.iter().find_map(|strategy| strategy(text))
}
