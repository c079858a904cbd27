//! Configuration types for roster scheduling.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::PenaltyRule;

/// Store scheduling policy.
///
/// When a store has no stored policy, [`SchedulePolicy::default`] supplies
/// the documented defaults and the compliance engine reports a MINOR
/// configuration issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePolicy {
    /// Minimum rest between consecutive shifts, in hours.
    pub min_hours_between_shifts: Decimal,
    /// Maximum shifts an employee may work per day.
    pub max_shifts_per_day: u32,
    /// Maximum consecutive working days before a rest day is required.
    pub max_consecutive_working_days: u32,
    /// Standard monthly hours for full-time contracts.
    pub monthly_standard_hours: Decimal,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            min_hours_between_shifts: Decimal::new(10, 0),
            max_shifts_per_day: 1,
            max_consecutive_working_days: 6,
            monthly_standard_hours: Decimal::new(152, 0),
        }
    }
}

/// The time window and paid hours a shift code expands to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftWindow {
    /// Window start time of day.
    pub start: NaiveTime,
    /// Window end time of day.
    pub end: NaiveTime,
    /// Paid hours for the window.
    pub hours: Decimal,
}

/// The fixed shift-code-to-time-window lookup table the engines consult.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftCodeTable {
    windows: HashMap<String, ShiftWindow>,
}

impl ShiftCodeTable {
    /// The standard shift-code table:
    /// `1F` 06:30–15:30 (9h), `2F` 14:00–23:00 (9h), `3F` 08:00–20:00 (12h),
    /// `S` 06:30–15:00 (8.5h), `SC` 11:00–20:00 (9h).
    pub fn standard() -> Self {
        let mut windows = HashMap::new();
        let mut insert = |code: &str, sh: u32, sm: u32, eh: u32, em: u32, hours: Decimal| {
            windows.insert(
                code.to_string(),
                ShiftWindow {
                    start: NaiveTime::from_hms_opt(sh, sm, 0).unwrap_or_default(),
                    end: NaiveTime::from_hms_opt(eh, em, 0).unwrap_or_default(),
                    hours,
                },
            );
        };
        insert("1F", 6, 30, 15, 30, Decimal::new(9, 0));
        insert("2F", 14, 0, 23, 0, Decimal::new(9, 0));
        insert("3F", 8, 0, 20, 0, Decimal::new(12, 0));
        insert("S", 6, 30, 15, 0, Decimal::new(85, 1));
        insert("SC", 11, 0, 20, 0, Decimal::new(9, 0));
        Self { windows }
    }

    /// Looks up the window for a shift code, falling back to a standard
    /// 09:00–17:00 (8h) window for unknown codes.
    pub fn window(&self, code: &str) -> ShiftWindow {
        self.windows.get(code).cloned().unwrap_or(ShiftWindow {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            hours: Decimal::new(8, 0),
        })
    }
}

impl Default for ShiftCodeTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// The default penalty-rule set used when a store carries no rules of its
/// own. The resolver still requires rules to be explicitly supplied; these
/// defaults exist so a degraded run can continue after the CRITICAL
/// configuration issue has been reported.
///
/// Day-of-week numbering is 0 = Sunday through 6 = Saturday.
pub fn default_penalty_rules() -> Vec<PenaltyRule> {
    fn rule(
        id: &str,
        multiplier: Decimal,
        description: &str,
    ) -> PenaltyRule {
        PenaltyRule {
            id: id.to_string(),
            day_of_week: None,
            start_time: None,
            end_time: None,
            employment_type: None,
            multiplier,
            is_public_holiday: false,
            description: description.to_string(),
        }
    }

    let mut rules = Vec::new();

    let mut public_holiday = rule(
        "public_holiday",
        Decimal::new(225, 2),
        "Public holiday loading",
    );
    public_holiday.is_public_holiday = true;
    rules.push(public_holiday);

    let mut sunday_casual = rule("sunday_casual", Decimal::new(20, 1), "Sunday casual loading");
    sunday_casual.day_of_week = Some(0);
    sunday_casual.employment_type = Some(crate::models::EmploymentType::Casual);
    rules.push(sunday_casual);

    let mut sunday = rule("sunday", Decimal::new(175, 2), "Sunday loading");
    sunday.day_of_week = Some(0);
    rules.push(sunday);

    let mut saturday_casual = rule(
        "saturday_casual",
        Decimal::new(15, 1),
        "Saturday casual loading",
    );
    saturday_casual.day_of_week = Some(6);
    saturday_casual.employment_type = Some(crate::models::EmploymentType::Casual);
    rules.push(saturday_casual);

    let mut saturday = rule("saturday", Decimal::new(125, 2), "Saturday loading");
    saturday.day_of_week = Some(6);
    rules.push(saturday);

    let mut evening = rule("evening", Decimal::new(115, 2), "Evening loading");
    evening.start_time = NaiveTime::from_hms_opt(18, 0, 0);
    evening.end_time = NaiveTime::from_hms_opt(23, 0, 0);
    rules.push(evening);

    let mut early_morning = rule(
        "early_morning",
        Decimal::new(115, 2),
        "Early morning loading",
    );
    early_morning.start_time = NaiveTime::from_hms_opt(0, 0, 0);
    early_morning.end_time = NaiveTime::from_hms_opt(6, 0, 0);
    rules.push(early_morning);

    rules
}
