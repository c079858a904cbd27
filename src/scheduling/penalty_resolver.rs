//! Penalty-rate resolution.
//!
//! Given a shift's date, time-of-day window and employment type, resolves
//! the applicable statutory pay multiplier from an ordered rule list.
//!
//! The matching order is significant and encodes legal precedence:
//! holiday pay supersedes weekend pay supersedes time-of-day loading.
//!
//! 1. If the shift falls on a public holiday, the first rule with
//!    `is_public_holiday` wins.
//! 2. Otherwise the first rule whose `day_of_week` equals the shift's
//!    day of week (and whose employment type is unset or matches) wins.
//! 3. Otherwise the first time-range rule containing the shift start
//!    (and matching employment type) wins.
//!
//! No match yields multiplier 1 with no applied rule.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::models::{EmploymentType, PenaltyRule, Shift};

/// The outcome of resolving a shift's penalty rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyOutcome {
    /// The applicable pay multiplier (1 when no rule matched).
    pub multiplier: Decimal,
    /// The id of the rule that matched, when one did.
    pub applied_rule_id: Option<String>,
    /// The matched rule's description.
    pub reason: Option<String>,
}

impl PenaltyOutcome {
    fn none() -> Self {
        Self {
            multiplier: Decimal::ONE,
            applied_rule_id: None,
            reason: None,
        }
    }

    fn from_rule(rule: &PenaltyRule) -> Self {
        Self {
            multiplier: rule.multiplier,
            applied_rule_id: Some(rule.id.clone()),
            reason: Some(rule.description.clone()),
        }
    }
}

/// Converts a weekday to the rule numbering (0 = Sunday .. 6 = Saturday).
pub fn weekday_number(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// Resolves the penalty multiplier for a shift.
///
/// `is_holiday` is the caller's public-holiday determination for the shift
/// date; [`shift_penalty`] derives it from the calendar.
///
/// # Example
///
/// ```
/// use roster_engine::config::default_penalty_rules;
/// use roster_engine::models::EmploymentType;
/// use roster_engine::scheduling::resolve_penalty;
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// // 2025-12-09 is an ordinary Tuesday.
/// let outcome = resolve_penalty(
///     NaiveDate::from_ymd_opt(2025, 12, 9).unwrap(),
///     NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
///     EmploymentType::FullTime,
///     &default_penalty_rules(),
///     false,
/// );
/// assert_eq!(outcome.multiplier, Decimal::ONE);
/// assert_eq!(outcome.applied_rule_id, None);
/// ```
pub fn resolve_penalty(
    date: NaiveDate,
    start: NaiveTime,
    _end: NaiveTime,
    employment_type: EmploymentType,
    rules: &[PenaltyRule],
    is_holiday: bool,
) -> PenaltyOutcome {
    if is_holiday {
        if let Some(rule) = rules.iter().find(|r| r.is_public_holiday) {
            return PenaltyOutcome::from_rule(rule);
        }
    }

    let dow = weekday_number(date.weekday());
    if let Some(rule) = rules.iter().find(|r| {
        !r.is_public_holiday
            && r.day_of_week == Some(dow)
            && employment_matches(r.employment_type, employment_type)
    }) {
        return PenaltyOutcome::from_rule(rule);
    }

    if let Some(rule) = rules.iter().find(|r| {
        !r.is_public_holiday
            && r.day_of_week.is_none()
            && matches!((r.start_time, r.end_time), (Some(from), Some(to)) if from <= start && start <= to)
            && employment_matches(r.employment_type, employment_type)
    }) {
        return PenaltyOutcome::from_rule(rule);
    }

    PenaltyOutcome::none()
}

fn employment_matches(rule_type: Option<EmploymentType>, actual: EmploymentType) -> bool {
    rule_type.is_none() || rule_type == Some(actual)
}

/// Resolves the penalty multiplier for a roster shift, deriving the
/// public-holiday flag from the calendar for the given region.
pub fn shift_penalty(
    shift: &Shift,
    employment_type: EmploymentType,
    rules: &[PenaltyRule],
    region: Option<&str>,
) -> PenaltyOutcome {
    let is_holiday = calendar::is_public_holiday(shift.date(), region);
    resolve_penalty(
        shift.date(),
        shift.start.time(),
        shift.end.time(),
        employment_type,
        rules,
        is_holiday,
    )
}
