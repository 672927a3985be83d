//! Flexible date parsing and calendar-month helpers.
//!
//! Sources disagree on date formats: price paid data uses
//! `YYYY-MM-DD HH:MM`, planning portals use `D/M/YYYY`, and HPI series use
//! either `YYYY-MM` or a full date. Everything is reduced to a
//! [`NaiveDate`] and, for series joins, to a zero-padded `YYYY-MM` key.

use chrono::{Datelike, Months, NaiveDate};

/// Parse a date in any of the supported forms.
///
/// Accepted forms:
/// - `D/M/YYYY` and `DD/MM/YYYY` (day first)
/// - `YYYY-MM-DD`, optionally followed by a time (`T...` or ` HH:MM`)
/// - `YYYY/MM/DD`
/// - `YYYY-MM` (resolved to the first day of the month)
///
/// Returns `None` for anything else, including out-of-range components.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim().trim_matches('"');
    if s.is_empty() {
        return None;
    }

    if s.contains('/') {
        return parse_slashed(s);
    }

    let date_part = s.split(['T', ' ']).next().unwrap_or(s);
    let mut parts = date_part.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_slashed(s: &str) -> Option<NaiveDate> {
    let date_part = s.split(' ').next().unwrap_or(s);
    let parts: Vec<&str> = date_part.split('/').collect();
    if parts.len() != 3 {
        return None;
    }

    // A four-digit leading component means YYYY/MM/DD, otherwise day first.
    if parts[0].len() == 4 {
        let year: i32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let day: u32 = parts[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    } else {
        let day: u32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let year: i32 = parts[2].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Zero-padded `YYYY-MM` key for a date.
pub fn month_key(date: NaiveDate) -> String {
    format_month_key(date.year(), date.month())
}

/// Zero-padded `YYYY-MM` key for a year and month.
pub fn format_month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// Split a `YYYY-MM` key back into its year and month.
pub fn parse_month_key(key: &str) -> Option<(i32, u32)> {
    let (year, month) = key.split_once('-')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

/// The calendar month before `(year, month)`, wrapping December into the prior year.
pub const fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Months since year zero; differences give whole-month distances.
pub const fn month_index(year: i32, month: u32) -> i32 {
    year * 12 + (month as i32 - 1)
}

/// `date` minus `months` calendar months, clamping the day to the target month.
///
/// Saturates at [`NaiveDate::MIN`] rather than failing.
pub fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("2023-05-12", ymd(2023, 5, 12))]
    #[case("2023-05-12 00:00", ymd(2023, 5, 12))]
    #[case("2023-05-12T10:30:00Z", ymd(2023, 5, 12))]
    #[case("12/05/2023", ymd(2023, 5, 12))]
    #[case("1/2/2024", ymd(2024, 2, 1))]
    #[case("2024/02/29", ymd(2024, 2, 29))]
    #[case("2021-07", ymd(2021, 7, 1))]
    #[case("  \"2020-01-31\" ", ymd(2020, 1, 31))]
    fn test_parse_supported_forms(#[case] raw: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_flexible_date(raw), Some(expected));
    }

    #[rstest]
    #[case("")]
    #[case("not a date")]
    #[case("31/02/2023")]
    #[case("2023-13-01")]
    #[case("2023-01-01-01")]
    #[case("12/2023")]
    fn test_parse_rejects(#[case] raw: &str) {
        assert_eq!(parse_flexible_date(raw), None);
    }

    #[test]
    fn test_month_keys() {
        assert_eq!(month_key(ymd(2023, 3, 9)), "2023-03");
        assert_eq!(format_month_key(999, 12), "0999-12");
        assert_eq!(parse_month_key("2023-03"), Some((2023, 3)));
        assert_eq!(parse_month_key("2023-00"), None);
        assert_eq!(parse_month_key("garbage"), None);
    }

    #[test]
    fn test_previous_month_wraps() {
        assert_eq!(previous_month(2024, 1), (2023, 12));
        assert_eq!(previous_month(2024, 7), (2024, 6));
    }

    #[test]
    fn test_months_before_is_calendar_based() {
        assert_eq!(months_before(ymd(2024, 3, 15), 12), ymd(2023, 3, 15));
        // Leap day clamps to the end of February
        assert_eq!(months_before(ymd(2024, 2, 29), 12), ymd(2023, 2, 28));
    }

    #[test]
    fn test_month_index_distance() {
        assert_eq!(month_index(2024, 3) - month_index(2023, 3), 12);
        assert_eq!(month_index(2024, 1) - month_index(2023, 12), 1);
    }
}
