//! Compliance validation.
//!
//! Validates a roster against statutory rules and pairs each mechanically
//! correctable violation with a machine-applicable suggestion. Validators
//! run independently and accumulate findings; a later validator always runs
//! even when an earlier one found violations. The engine is a pure function
//! of its inputs so the cost optimizer can call it repeatedly as the single
//! source of truth for the rules.

use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use crate::config::{SchedulePolicy, default_penalty_rules};
use crate::models::{
    ComplianceIssue, ComplianceReport, ComplianceSuggestion, EmployeeContract, IssueCode,
    PenaltyRule, Roster, Severity, SuggestedChange, SuggestionType,
};
use crate::scheduling::penalty_resolver::shift_penalty;

/// Default minimum rest between consecutive shifts, in hours.
pub const DEFAULT_MIN_REST_HOURS: u32 = 10;

/// Minimum engagement for a casual shift, in hours.
const CASUAL_MIN_SHIFT_HOURS: u32 = 3;

/// Maximum span of a single shift, in hours.
const MAX_SHIFT_SPAN_HOURS: u32 = 12;

/// Penalty multiplier at or above which a shift is flagged for reassignment.
const HIGH_PENALTY_THRESHOLD: Decimal = Decimal::TWO;

/// Returns the rest period between two shifts, in hours.
///
/// # Example
///
/// ```
/// use roster_engine::scheduling::rest_hours;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let prev_end = NaiveDateTime::parse_from_str("2025-12-09 14:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let next_start = NaiveDateTime::parse_from_str("2025-12-10 06:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// assert_eq!(rest_hours(prev_end, next_start), Decimal::new(16, 0));
/// ```
pub fn rest_hours(prev_end: NaiveDateTime, next_start: NaiveDateTime) -> Decimal {
    let minutes = (next_start - prev_end).num_minutes();
    Decimal::new(minutes, 0) / Decimal::new(60, 0)
}

/// Validates rosters against statutory labour-compliance rules.
pub struct ComplianceEngine;

impl ComplianceEngine {
    /// Validates a roster.
    ///
    /// Missing configuration degrades rather than aborting: absent penalty
    /// rules are a CRITICAL finding (validation continues with the default
    /// rule set), an absent policy is a MINOR finding with documented
    /// defaults substituted, and a missing contract is a MINOR finding with
    /// casual fallback terms. The report's `passed` flag is true exactly
    /// when no CRITICAL issue is present.
    ///
    /// Specialist coverage is only assessed for stations that appear as some
    /// contract's `default_station_code`; a station no contract designates a
    /// specialist for is never flagged.
    pub fn validate(
        roster: &Roster,
        contracts: &[EmployeeContract],
        policy: Option<&SchedulePolicy>,
        penalty_rules: Option<&[PenaltyRule]>,
        region: Option<&str>,
    ) -> ComplianceReport {
        let mut issues: Vec<ComplianceIssue> = Vec::new();
        let mut suggestions: Vec<ComplianceSuggestion> = Vec::new();

        // (a) configuration presence.
        let default_rules;
        let rules: &[PenaltyRule] = match penalty_rules {
            Some(rules) => rules,
            None => {
                issues.push(ComplianceIssue {
                    employee_id: None,
                    code: IssueCode::MissingPenaltyRules,
                    severity: Severity::Critical,
                    details: json!({
                        "store_id": roster.store_id,
                        "note": "no penalty rules configured, defaults substituted",
                    }),
                });
                default_rules = default_penalty_rules();
                &default_rules
            }
        };
        let default_policy;
        let policy = match policy {
            Some(policy) => policy,
            None => {
                issues.push(ComplianceIssue {
                    employee_id: None,
                    code: IssueCode::MissingPolicy,
                    severity: Severity::Minor,
                    details: json!({
                        "store_id": roster.store_id,
                        "note": "no scheduling policy configured, defaults substituted",
                    }),
                });
                default_policy = SchedulePolicy::default();
                &default_policy
            }
        };

        // Effective contracts, substituting casual fallbacks.
        let stored: HashMap<&str, &EmployeeContract> = contracts
            .iter()
            .map(|c| (c.employee_id.as_str(), c))
            .collect();
        let mut effective: BTreeMap<String, EmployeeContract> = BTreeMap::new();
        for employee_id in roster.employee_ids() {
            match stored.get(employee_id.as_str()) {
                Some(contract) => {
                    effective.insert(employee_id, (*contract).clone());
                }
                None => {
                    issues.push(ComplianceIssue {
                        employee_id: Some(employee_id.clone()),
                        code: IssueCode::MissingContract,
                        severity: Severity::Minor,
                        details: json!({
                            "note": "no contract on file, casual defaults substituted",
                        }),
                    });
                    effective.insert(employee_id.clone(), EmployeeContract::fallback(employee_id));
                }
            }
        }

        // (b) per-shift duration rules.
        for (index, shift) in roster.shifts.iter().enumerate() {
            let contract = &effective[&shift.employee_id];
            let duration = shift.duration_hours();

            if contract.employment_type == crate::models::EmploymentType::Casual
                && duration < Decimal::from(CASUAL_MIN_SHIFT_HOURS)
            {
                issues.push(ComplianceIssue {
                    employee_id: Some(shift.employee_id.clone()),
                    code: IssueCode::MinShiftLengthViolation,
                    severity: Severity::Critical,
                    details: json!({
                        "shift_index": index,
                        "duration_hours": duration.to_string(),
                        "minimum_hours": CASUAL_MIN_SHIFT_HOURS,
                    }),
                });
                suggestions.push(ComplianceSuggestion {
                    suggestion_type: SuggestionType::ExtendShift,
                    employee_id: shift.employee_id.clone(),
                    shift_index: Some(index),
                    change: Some(SuggestedChange::NewEnd {
                        end: shift.start + Duration::hours(CASUAL_MIN_SHIFT_HOURS as i64),
                    }),
                    related_issue: Some(IssueCode::MinShiftLengthViolation),
                });
            }

            if duration > Decimal::from(MAX_SHIFT_SPAN_HOURS) {
                issues.push(ComplianceIssue {
                    employee_id: Some(shift.employee_id.clone()),
                    code: IssueCode::MaxShiftSpanViolation,
                    severity: Severity::Critical,
                    details: json!({
                        "shift_index": index,
                        "duration_hours": duration.to_string(),
                        "maximum_hours": MAX_SHIFT_SPAN_HOURS,
                    }),
                });
                suggestions.push(ComplianceSuggestion {
                    suggestion_type: SuggestionType::ShortenShift,
                    employee_id: shift.employee_id.clone(),
                    shift_index: Some(index),
                    change: Some(SuggestedChange::NewEnd {
                        end: shift.start + Duration::hours(MAX_SHIFT_SPAN_HOURS as i64),
                    }),
                    related_issue: Some(IssueCode::MaxShiftSpanViolation),
                });
            }
        }

        // (c) high penalty multipliers (informational, not blocking).
        for (index, shift) in roster.shifts.iter().enumerate() {
            let contract = &effective[&shift.employee_id];
            let outcome = shift_penalty(shift, contract.employment_type, rules, region);
            if outcome.multiplier >= HIGH_PENALTY_THRESHOLD {
                issues.push(ComplianceIssue {
                    employee_id: Some(shift.employee_id.clone()),
                    code: IssueCode::HighPenaltyRate,
                    severity: Severity::Major,
                    details: json!({
                        "shift_index": index,
                        "multiplier": outcome.multiplier.to_string(),
                        "applied_rule": outcome.applied_rule_id,
                    }),
                });
                suggestions.push(ComplianceSuggestion {
                    suggestion_type: SuggestionType::ReassignShift,
                    employee_id: shift.employee_id.clone(),
                    shift_index: Some(index),
                    change: Some(SuggestedChange::Reassign { employee_id: None }),
                    related_issue: Some(IssueCode::HighPenaltyRate),
                });
            }
        }

        // (d) rest between consecutive shifts.
        for (employee_id, contract) in &effective {
            let min_rest = contract
                .min_hours_between_shifts
                .unwrap_or(policy.min_hours_between_shifts);
            let shifts = roster.shifts_for_employee(employee_id);
            for pair in shifts.windows(2) {
                let (_, prev) = pair[0];
                let (next_index, next) = pair[1];
                let rest = rest_hours(prev.end, next.start);
                if rest < min_rest {
                    let shortfall = min_rest - rest;
                    let shortfall_minutes = (shortfall * Decimal::new(60, 0))
                        .to_i64()
                        .unwrap_or(0);
                    issues.push(ComplianceIssue {
                        employee_id: Some(employee_id.clone()),
                        code: IssueCode::MinRestPeriodViolation,
                        severity: Severity::Critical,
                        details: json!({
                            "shift_index": next_index,
                            "rest_hours": rest.to_string(),
                            "minimum_hours": min_rest.to_string(),
                        }),
                    });
                    suggestions.push(ComplianceSuggestion {
                        suggestion_type: SuggestionType::MoveShift,
                        employee_id: employee_id.clone(),
                        shift_index: Some(next_index),
                        change: Some(SuggestedChange::NewWindow {
                            start: next.start + Duration::minutes(shortfall_minutes),
                            end: next.end + Duration::minutes(shortfall_minutes),
                        }),
                        related_issue: Some(IssueCode::MinRestPeriodViolation),
                    });
                }
            }
        }

        // (e) weekly hours above the contract maximum.
        for (employee_id, contract) in &effective {
            let worked = roster.total_hours_for(employee_id);
            let cap = contract.effective_max_hours();
            if worked > cap {
                issues.push(ComplianceIssue {
                    employee_id: Some(employee_id.clone()),
                    code: IssueCode::MaxWeeklyHoursViolation,
                    severity: Severity::Critical,
                    details: json!({
                        "worked_hours": worked.to_string(),
                        "maximum_hours": cap.to_string(),
                    }),
                });
                suggestions.push(ComplianceSuggestion {
                    suggestion_type: SuggestionType::RemoveShift,
                    employee_id: employee_id.clone(),
                    // No index: resolution targets the last chronological shift.
                    shift_index: None,
                    change: None,
                    related_issue: Some(IssueCode::MaxWeeklyHoursViolation),
                });
            }
        }

        // (f) consecutive working days. Only the first violating streak per
        // employee is reported.
        for employee_id in effective.keys() {
            let dates: BTreeSet<_> = roster
                .shifts
                .iter()
                .filter(|s| &s.employee_id == employee_id)
                .map(|s| s.date())
                .collect();
            let dates: Vec<_> = dates.into_iter().collect();
            let max_days = policy.max_consecutive_working_days;

            let mut streak_start = 0;
            for i in 0..dates.len() {
                if i > 0 && dates[i] != dates[i - 1] + Duration::days(1) {
                    streak_start = i;
                }
                let streak_len = (i - streak_start + 1) as u32;
                if streak_len > max_days {
                    let rest_date = dates[i];
                    issues.push(ComplianceIssue {
                        employee_id: Some(employee_id.clone()),
                        code: IssueCode::MaxConsecutiveDaysViolation,
                        severity: Severity::Critical,
                        details: json!({
                            "streak_start": dates[streak_start].to_string(),
                            "consecutive_days": streak_len,
                            "maximum_days": max_days,
                        }),
                    });
                    suggestions.push(ComplianceSuggestion {
                        suggestion_type: SuggestionType::AddRestDay,
                        employee_id: employee_id.clone(),
                        shift_index: None,
                        change: Some(SuggestedChange::RestDay { date: rest_date }),
                        related_issue: Some(IssueCode::MaxConsecutiveDaysViolation),
                    });
                    break;
                }
            }
        }

        // (g) weekly hours below the employment-type minimum.
        for (employee_id, contract) in &effective {
            let worked = roster.total_hours_for(employee_id);
            let minimum = contract.employment_type.weekly_hour_minimum();
            if worked > Decimal::ZERO && worked < minimum {
                issues.push(ComplianceIssue {
                    employee_id: Some(employee_id.clone()),
                    code: IssueCode::MinWeeklyHoursShortfall,
                    severity: Severity::Major,
                    details: json!({
                        "worked_hours": worked.to_string(),
                        "minimum_hours": minimum.to_string(),
                    }),
                });
                suggestions.push(ComplianceSuggestion {
                    suggestion_type: SuggestionType::AssignMoreShifts,
                    employee_id: employee_id.clone(),
                    shift_index: None,
                    change: Some(SuggestedChange::AddHours {
                        hours: minimum - worked,
                    }),
                    related_issue: Some(IssueCode::MinWeeklyHoursShortfall),
                });
            }
        }

        // (h) specialist coverage: a station/date staffed entirely by
        // non-specialists, when specialists for that station exist at all.
        let specialist_stations: BTreeSet<&str> = contracts
            .iter()
            .filter_map(|c| c.default_station_code.as_deref())
            .collect();
        let mut station_dates: BTreeSet<(String, chrono::NaiveDate)> = BTreeSet::new();
        for shift in &roster.shifts {
            station_dates.insert((shift.station.clone(), shift.date()));
        }
        for (station, date) in &station_dates {
            if !specialist_stations.contains(station.as_str()) {
                continue;
            }
            let has_specialist = roster.shifts.iter().any(|s| {
                s.station == *station
                    && s.date() == *date
                    && effective
                        .get(&s.employee_id)
                        .and_then(|c| c.default_station_code.as_deref())
                        == Some(station.as_str())
            });
            if !has_specialist {
                issues.push(ComplianceIssue {
                    employee_id: None,
                    code: IssueCode::SpecialistCoverageGap,
                    severity: Severity::Major,
                    details: json!({
                        "station": station,
                        "date": date.to_string(),
                        "note": "no employee with this default station is assigned",
                    }),
                });
            }
        }

        let passed = !issues.iter().any(|i| i.severity == Severity::Critical);
        let summary = format!(
            "{} issues ({} critical, {} major, {} minor), {} suggestions",
            issues.len(),
            issues.iter().filter(|i| i.severity == Severity::Critical).count(),
            issues.iter().filter(|i| i.severity == Severity::Major).count(),
            issues.iter().filter(|i| i.severity == Severity::Minor).count(),
            suggestions.len(),
        );
        debug!(
            store_id = roster.store_id.as_str(),
            passed, summary = summary.as_str(),
            "compliance validation finished"
        );

        ComplianceReport {
            passed,
            issues,
            suggestions,
            summary,
        }
    }
}
