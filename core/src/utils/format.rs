//! Display formatting for dates and ratings.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

pub const NOT_AVAILABLE: &str = "N/A";
pub const INVALID_DATE: &str = "Invalid Date";

const DISPLAY_FORMAT: &str = "%b %-d, %Y, %I:%M %p";
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const FILLED_STAR: char = '★';
const EMPTY_STAR: char = '☆';
const MAX_RATING: u8 = 5;

/// Render an ISO-like timestamp as a short en-US date and time.
///
/// Offset-bearing timestamps are shown in local time; naive ones are shown
/// as written. Date-only values render at midnight.
pub fn format_date(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return NOT_AVAILABLE.to_string();
    };
    match parse_timestamp(raw) {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => INVALID_DATE.to_string(),
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Five stars, `rating` of them filled. Out-of-range ratings are clamped.
pub fn format_rating(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    let empty = MAX_RATING as usize - filled;
    std::iter::repeat(FILLED_STAR)
        .take(filled)
        .chain(std::iter::repeat(EMPTY_STAR).take(empty))
        .collect()
}

/// Mean rating rounded to one decimal place; `0.0` for no ratings.
pub fn average_rating<I>(ratings: I) -> f64
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = ratings
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), r| (sum + u64::from(r), count + 1));
    if count == 0 {
        return 0.0;
    }
    let mean = sum as f64 / count as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_dates_are_not_available() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("  ")), "N/A");
    }

    #[test]
    fn sqlite_timestamps_render() {
        assert_eq!(format_date(Some("2026-03-01 14:05:09")), "Mar 1, 2026, 02:05 PM");
    }

    #[test]
    fn iso_naive_and_date_only_render() {
        assert_eq!(format_date(Some("2026-10-17T09:30")), "Oct 17, 2026, 09:30 AM");
        assert_eq!(format_date(Some("2026-12-24")), "Dec 24, 2026, 12:00 AM");
    }

    #[test]
    fn garbage_is_an_invalid_date() {
        assert_eq!(format_date(Some("yesterday-ish")), "Invalid Date");
    }

    #[test]
    fn rating_is_always_five_glyphs() {
        assert_eq!(format_rating(3), "★★★☆☆");
        assert_eq!(format_rating(0), "☆☆☆☆☆");
        assert_eq!(format_rating(5), "★★★★★");
        assert_eq!(format_rating(9).chars().count(), 5);
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(average_rating(Vec::new()), 0.0);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        assert_eq!(average_rating([4, 5]), 4.5);
        assert_eq!(average_rating([5, 4, 4]), 4.3);
        assert_eq!(format!("{:.1}", average_rating([4, 5])), "4.5");
    }
}
