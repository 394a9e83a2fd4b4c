use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use regex::Regex;

const PROMOTIONAL_PHRASES: [&str; 13] = [
    "advertisement",
    "sponsored",
    "promo",
    "deal",
    "offer",
    "discount",
    "sale",
    "buy now",
    "shop now",
    "limited time",
    "free trial",
    "sign up",
    "subscribe",
];

static PROMOTIONAL: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = PROMOTIONAL_PHRASES
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).expect("valid denylist pattern")
});

/// Parse a feed date, falling back to `now` when absent or unrecognized.
pub fn parse_published(date: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let Some(s) = date.map(str::trim).filter(|s| !s.is_empty()) else {
        return now;
    };

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return naive.and_utc();
    }

    tracing::debug!("Unparseable date {:?}, using current time", s);
    now
}

/// Case-insensitive denylist match over title and summary.
pub fn is_promotional(title: &str, summary: &str) -> bool {
    let text = format!("{} {}", title, summary).to_lowercase();
    PROMOTIONAL.is_match(&text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Stale,
    Promotional,
}

/// Staleness and promotional checks for one ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct ContentFilter {
    cutoff: DateTime<Utc>,
}

impl ContentFilter {
    pub fn new(now: DateTime<Utc>, retention: Duration) -> Self {
        Self {
            cutoff: now - retention,
        }
    }

    pub fn check(&self, title: &str, summary: &str, pub_date: DateTime<Utc>) -> Verdict {
        if pub_date < self.cutoff {
            Verdict::Stale
        } else if is_promotional(title, summary) {
            Verdict::Promotional
        } else {
            Verdict::Keep
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_rfc2822() {
        let dt = parse_published(Some("Tue, 14 Jan 2025 10:30:00 +0200"), now());
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 14, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_iso_with_offset() {
        let dt = parse_published(Some("2025-01-14T10:30:00+00:00"), now());
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 14, 10, 30, 0).unwrap());

        let dt = parse_published(Some("2025-01-14T10:30:00-0500"), now());
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 14, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let dt = parse_published(Some("2025-01-13 09:15:00"), now());
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 13, 9, 15, 0).unwrap());
    }

    #[test]
    fn test_parse_fallback_to_now() {
        assert_eq!(parse_published(None, now()), now());
        assert_eq!(parse_published(Some(""), now()), now());
        assert_eq!(parse_published(Some("yesterday-ish"), now()), now());
    }

    #[test]
    fn test_stale_entry_rejected() {
        let filter = ContentFilter::new(now(), Duration::hours(48));
        let published = now() - Duration::hours(72);
        assert_eq!(
            filter.check("Kernel 6.13 released", "Changelog inside", published),
            Verdict::Stale
        );
    }

    #[test]
    fn test_stale_wins_over_promotional() {
        let filter = ContentFilter::new(now(), Duration::hours(48));
        let published = now() - Duration::hours(49);
        assert_eq!(filter.check("Huge sale", "", published), Verdict::Stale);
    }

    #[test]
    fn test_promotional_title_rejected() {
        let filter = ContentFilter::new(now(), Duration::hours(48));
        let published = now() - Duration::hours(1);
        assert_eq!(
            filter.check("Big Sale on Laptops!", "", published),
            Verdict::Promotional
        );
    }

    #[test]
    fn test_promotional_summary_is_case_insensitive() {
        assert!(is_promotional("Weekly roundup", "SPONSORED by Example Corp"));
        assert!(is_promotional("Please Sign Up", ""));
        assert!(!is_promotional("Rust 1.84 ships", "Compiler improvements"));
    }

    #[test]
    fn test_fresh_clean_entry_kept() {
        let filter = ContentFilter::new(now(), Duration::hours(48));
        assert_eq!(
            filter.check("Rust 1.84 ships", "Compiler improvements", now()),
            Verdict::Keep
        );
        assert_eq!(
            filter.check("Rust 1.84 ships", "", now() - Duration::hours(47)),
            Verdict::Keep
        );
    }
}
