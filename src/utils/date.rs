//! Date handling for frontmatter fields and sitemap timestamps.
//!
//! Frontmatter dates arrive as strings, either plain `YYYY-MM-DD` or full
//! RFC 3339. Sitemaps want W3C dates (`YYYY-MM-DD`), sorting wants a
//! numeric key where an absent date counts as the Unix epoch.

use chrono::{DateTime, NaiveDate, Utc};

// ============================================================================
// Parsing
// ============================================================================

/// Parse a date string in `YYYY-MM-DD` or RFC 3339 format.
///
/// Returns `None` for anything else, including partially valid input.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Sort key in Unix seconds. Missing or unparseable dates sort as epoch.
pub fn sort_key(date: Option<&str>) -> i64 {
    date.and_then(parse_date).map(|dt| dt.timestamp()).unwrap_or(0)
}

// ============================================================================
// Formatting
// ============================================================================

/// Reduce a date string to the W3C `YYYY-MM-DD` form used by sitemaps.
pub fn lastmod_ymd(s: &str) -> Option<String> {
    parse_date(s).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Today's date in `YYYY-MM-DD`, UTC.
pub fn today_ymd() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

// ============================================================================
// Tests
// ============================================================================
