//! Utility functions

use crate::constants::{DATA_DIR_ENV, DATA_DIR_NAME};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use std::path::PathBuf;

/// Current local wall-clock time. Save files store naive local timestamps.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Resolve the data directory, honouring the `ZERO2ONE_DATA_DIR` override
pub fn get_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

/// Key used for per-day statistics
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// True when both dates fall in the same ISO week
pub fn same_iso_week(a: NaiveDate, b: NaiveDate) -> bool {
    a.iso_week() == b.iso_week()
}

/// Human-readable "time ago" for a past timestamp
pub fn format_time_ago(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let diff = now - then;
    let days = diff.num_days();
    if days > 30 {
        format!("{}mo ago", days / 30)
    } else if days > 0 {
        format!("{}d ago", days)
    } else if diff.num_hours() > 0 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_minutes() > 0 {
        format!("{}m ago", diff.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Remaining time until `end`, formatted as "Xh Ym"
pub fn format_remaining(end: NaiveDateTime, now: NaiveDateTime) -> String {
    let left = end - now;
    if left.num_seconds() <= 0 {
        return "ending".to_string();
    }
    let hours = left.num_hours();
    let minutes = left.num_minutes() % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes.max(1))
    }
}

/// Format attribute points: whole numbers without decimals, otherwise one decimal
pub fn format_points(points: f64) -> String {
    if (points - points.round()).abs() < 0.05 {
        format!("{:.0}", points)
    } else {
        format!("{:.1}", points)
    }
}

/// Compare two version strings, returns true if a > b
pub fn version_greater_than(a: &str, b: &str) -> bool {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|s| s.parse().ok()).collect() };
    parse(a) > parse(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_format_time_ago() {
        let now = at("2024-05-10 12:00:00");
        assert_eq!(format_time_ago(now, now), "just now");
        assert_eq!(format_time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_time_ago(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_time_ago(now - Duration::days(2), now), "2d ago");
        assert_eq!(format_time_ago(now - Duration::days(65), now), "2mo ago");
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(12.0), "12");
        assert_eq!(format_points(2.3), "2.3");
        assert_eq!(format_points(0.0), "0");
    }

    #[test]
    fn test_same_iso_week() {
        // 2024-05-06 is a Monday
        let monday = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 5, 12).unwrap();
        let next_monday = NaiveDate::from_ymd_opt(2024, 5, 13).unwrap();
        assert!(same_iso_week(monday, sunday));
        assert!(!same_iso_week(sunday, next_monday));
    }

    #[test]
    fn test_version_compare() {
        assert!(version_greater_than("1.1", "1.0"));
        assert!(!version_greater_than("1.0", "1.0"));
        assert!(!version_greater_than("0.9", "1.0"));
    }
}
