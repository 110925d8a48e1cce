use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{ReaderError, Result};

/// Format of `ArticleRecord::date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ZONED_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
];

const NAIVE_FORMATS: [&str; 18] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M:%S",
    "%B %d, %Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%B %d, %Y %I:%M:%S %p",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%d %b %Y %I:%M %p",
    "%Y-%m-%d %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_ONLY_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y/%m/%d",
    "%d.%m.%Y",
];

static LEADING_WEEKDAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").unwrap());

// GMT, MSK, Z, +0300, -05:00
static TRAILING_ZONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:[A-Za-z]{1,5}|[+-]\d{2}:?\d{2})$").unwrap());

/// Parses the many shapes feeds use for `pubDate`. The offset, when present,
/// is dropped and the wall-clock time kept.
pub fn parse_pub_date(raw: &str) -> Result<NaiveDateTime> {
    let text = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc2822(text) {
        return Ok(parsed.naive_local());
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed.naive_local());
    }
    if let Some(parsed) = ZONED_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Ok(parsed.naive_local());
    }

    let without_weekday = LEADING_WEEKDAY.replace(text, "");
    let bare = strip_zone(&without_weekday).trim();

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(bare, fmt).ok())
        .or_else(|| {
            DATE_ONLY_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(bare, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| ReaderError::InvalidDate(raw.to_string()))
}

// AM/PM looks like a zone abbreviation but belongs to the time.
fn strip_zone(text: &str) -> &str {
    match TRAILING_ZONE.find(text) {
        Some(zone) if !matches!(zone.as_str().trim().to_ascii_lowercase().as_str(), "am" | "pm") => {
            &text[..zone.start()]
        }
        _ => text,
    }
}

/// `parse_pub_date` rendered as `YYYY-MM-DD HH:MM:SS`.
pub fn normalize_pub_date(raw: &str) -> Result<String> {
    Ok(parse_pub_date(raw)?.format(DATE_FORMAT).to_string())
}
