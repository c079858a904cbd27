//! Public-holiday calculation.
//!
//! A pure function of (year, region): fixed national holidays are
//! table-driven, the Easter-derived dates are computed with the standard
//! Gregorian computus, and region-specific holidays (the metro racing-day
//! holiday) are derived as the Nth weekday of a month. No external calendar
//! data is consulted; any Gregorian year from 1583 onward computes
//! correctly.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The default region used when a caller supplies none.
pub const DEFAULT_REGION: &str = "VIC";

/// A single public holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The holiday's name.
    pub name: String,
    /// Whether the holiday applies nationally.
    pub is_national: bool,
    /// The region the holiday is restricted to, when not national.
    #[serde(default)]
    pub region: Option<String>,
}

/// Computes the date of Easter Sunday for a Gregorian year.
///
/// Uses the anonymous Gregorian computus, valid for any year >= 1583.
///
/// # Example
///
/// ```
/// use roster_engine::calendar::easter_sunday;
/// use chrono::NaiveDate;
///
/// assert_eq!(
///     easter_sunday(2025),
///     NaiveDate::from_ymd_opt(2025, 4, 20).unwrap()
/// );
/// ```
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    // The computus always yields a valid March or April date.
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 4, 1).unwrap_or_default())
}

/// Returns the date of the nth occurrence of a weekday in a month.
fn nth_weekday_of_month(year: i32, month: u32, weekday: Weekday, n: u32) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
    let offset = (7 + weekday.num_days_from_monday() as i64
        - first.weekday().num_days_from_monday() as i64)
        % 7;
    first + Duration::days(offset + 7 * (n as i64 - 1))
}

/// Returns the public-holiday calendar for a year.
///
/// National holidays are always included; region-specific holidays are
/// included only when `region` matches. The result is a sorted map, so two
/// calls with the same arguments return identical calendars.
///
/// # Example
///
/// ```
/// use roster_engine::calendar::holidays_for_year;
/// use chrono::NaiveDate;
///
/// let holidays = holidays_for_year(2025, Some("VIC"));
/// let good_friday = NaiveDate::from_ymd_opt(2025, 4, 18).unwrap();
/// assert_eq!(holidays[&good_friday].name, "Good Friday");
/// ```
pub fn holidays_for_year(year: i32, region: Option<&str>) -> BTreeMap<NaiveDate, Holiday> {
    let mut holidays = BTreeMap::new();

    let national = |name: &str| Holiday {
        name: name.to_string(),
        is_national: true,
        region: None,
    };

    let fixed: [(u32, u32, &str); 5] = [
        (1, 1, "New Year's Day"),
        (1, 26, "Australia Day"),
        (4, 25, "Anzac Day"),
        (12, 25, "Christmas Day"),
        (12, 26, "Boxing Day"),
    ];
    for (month, day, name) in fixed {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            holidays.insert(date, national(name));
        }
    }

    let easter = easter_sunday(year);
    holidays.insert(easter - Duration::days(2), national("Good Friday"));
    holidays.insert(easter + Duration::days(1), national("Easter Monday"));

    if region == Some("VIC") {
        let cup_day = nth_weekday_of_month(year, 11, Weekday::Tue, 1);
        holidays.insert(
            cup_day,
            Holiday {
                name: "Melbourne Cup Day".to_string(),
                is_national: false,
                region: Some("VIC".to_string()),
            },
        );
    }

    holidays
}

/// Returns true if the date is a public holiday for the region.
pub fn is_public_holiday(date: NaiveDate, region: Option<&str>) -> bool {
    holidays_for_year(date.year(), region).contains_key(&date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ==========================================================================
    // HOL-001: Easter computus known dates
    // ==========================================================================
    #[test]
    fn test_hol_001_easter_sunday_known_years() {
        assert_eq!(easter_sunday(2024), date(2024, 3, 31));
        assert_eq!(easter_sunday(2025), date(2025, 4, 20));
        assert_eq!(easter_sunday(2026), date(2026, 4, 5));
        assert_eq!(easter_sunday(2000), date(2000, 4, 23));
        assert_eq!(easter_sunday(1886), date(1886, 4, 25));
    }

    // ==========================================================================
    // HOL-002: Easter-derived holidays for 2025
    // ==========================================================================
    #[test]
    fn test_hol_002_easter_derived_dates_2025() {
        let holidays = holidays_for_year(2025, None);
        assert_eq!(holidays[&date(2025, 4, 18)].name, "Good Friday");
        assert_eq!(holidays[&date(2025, 4, 21)].name, "Easter Monday");
    }

    // ==========================================================================
    // HOL-003: idempotence
    // ==========================================================================
    #[test]
    fn test_hol_003_lookup_is_idempotent() {
        let first = holidays_for_year(2025, Some("VIC"));
        let second = holidays_for_year(2025, Some("VIC"));
        assert_eq!(first, second);
    }

    // ==========================================================================
    // HOL-004: national holidays present regardless of region
    // ==========================================================================
    #[test]
    fn test_hol_004_national_holidays_for_any_region() {
        for region in [None, Some("VIC"), Some("NSW"), Some("QLD")] {
            let holidays = holidays_for_year(2025, region);
            assert!(holidays.contains_key(&date(2025, 1, 1)));
            assert!(holidays.contains_key(&date(2025, 1, 26)));
            assert!(holidays.contains_key(&date(2025, 4, 25)));
            assert!(holidays.contains_key(&date(2025, 12, 25)));
            assert!(holidays.contains_key(&date(2025, 12, 26)));
        }
    }

    // ==========================================================================
    // HOL-005: regional racing-day holiday only for VIC
    // ==========================================================================
    #[test]
    fn test_hol_005_melbourne_cup_only_for_vic() {
        // First Tuesday of November 2025 is the 4th.
        let cup_day = date(2025, 11, 4);

        let vic = holidays_for_year(2025, Some("VIC"));
        assert_eq!(vic[&cup_day].name, "Melbourne Cup Day");
        assert!(!vic[&cup_day].is_national);
        assert_eq!(vic[&cup_day].region.as_deref(), Some("VIC"));

        let nsw = holidays_for_year(2025, Some("NSW"));
        assert!(!nsw.contains_key(&cup_day));
        let none = holidays_for_year(2025, None);
        assert!(!none.contains_key(&cup_day));
    }

    #[test]
    fn test_nth_weekday_of_month() {
        // November 2025 starts on a Saturday.
        assert_eq!(
            nth_weekday_of_month(2025, 11, Weekday::Tue, 1),
            date(2025, 11, 4)
        );
        assert_eq!(
            nth_weekday_of_month(2025, 11, Weekday::Sat, 1),
            date(2025, 11, 1)
        );
        assert_eq!(
            nth_weekday_of_month(2025, 11, Weekday::Sat, 2),
            date(2025, 11, 8)
        );
        // First Tuesday of November 2026 is the 3rd.
        assert_eq!(
            nth_weekday_of_month(2026, 11, Weekday::Tue, 1),
            date(2026, 11, 3)
        );
    }

    #[test]
    fn test_is_public_holiday() {
        assert!(is_public_holiday(date(2025, 12, 25), None));
        assert!(is_public_holiday(date(2025, 4, 18), Some("NSW")));
        assert!(is_public_holiday(date(2025, 11, 4), Some("VIC")));
        assert!(!is_public_holiday(date(2025, 11, 4), Some("NSW")));
        assert!(!is_public_holiday(date(2025, 12, 9), Some("VIC")));
    }

    #[test]
    fn test_holidays_for_early_gregorian_year() {
        // 1583 is the first full Gregorian year; the computus must hold.
        let holidays = holidays_for_year(1583, None);
        assert!(holidays.contains_key(&easter_sunday(1583).pred_opt().unwrap().pred_opt().unwrap()));
        assert_eq!(easter_sunday(1583), date(1583, 4, 10));
    }
}
