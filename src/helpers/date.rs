//! Date helper functions

use chrono::{DateTime, NaiveDate, Utc};

/// Parse an ISO `YYYY-MM-DD` date, tolerating a trailing time part
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let date_part = s.get(..10).unwrap_or(s);
    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Format a date as `YYYY-MM-DD`
pub fn iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a date in full format (like "January 15, 2024")
pub fn full_date(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// RFC 3339 timestamp at midnight UTC, for feeds
pub fn rfc3339(date: &NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).to_rfc3339())
        .unwrap_or_default()
}

/// Estimated minutes to read a text, at least one
pub fn reading_minutes(text: &str) -> usize {
    const WORDS_PER_MINUTE: usize = 200;
    text.split_whitespace().count().div_ceil(WORDS_PER_MINUTE).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_iso_date("2024-01-15"), Some(date));
        assert_eq!(parse_iso_date("2024-01-15 10:30:00"), Some(date));
        assert_eq!(parse_iso_date("2024/01/15"), Some(date));
        assert_eq!(parse_iso_date("yesterday"), None);
    }

    #[test]
    fn test_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(iso_date(&date), "2024-01-05");
        assert_eq!(full_date(&date), "January 5, 2024");
        assert_eq!(rfc3339(&date), "2024-01-05T00:00:00+00:00");
    }

    #[test]
    fn test_reading_minutes() {
        assert_eq!(reading_minutes(""), 1);
        assert_eq!(reading_minutes(&"word ".repeat(401)), 3);
    }
}
