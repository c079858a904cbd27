//! Compliance issue and suggestion models.
//!
//! Issues are severity-tagged findings; only CRITICAL issues block
//! publication. Wherever mechanically derivable, an issue is paired with a
//! machine-applicable correction suggestion consumed by the conflict
//! resolution engine (and, pre-validated, by the cost optimizer).

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Compliance-issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational finding.
    Minor,
    /// Should be corrected; does not block publication.
    Major,
    /// Statutory violation that must block publication.
    Critical,
}

/// Machine-readable compliance issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// No penalty-rule configuration available for the store.
    MissingPenaltyRules,
    /// No scheduling policy available; documented defaults substituted.
    MissingPolicy,
    /// No contract stored for a rostered employee; casual defaults substituted.
    MissingContract,
    /// Casual shift shorter than the statutory minimum engagement (3h).
    MinShiftLengthViolation,
    /// Shift span exceeds the 12 hour maximum.
    MaxShiftSpanViolation,
    /// Shift attracts a penalty multiplier of 2.0 or more.
    HighPenaltyRate,
    /// Rest between consecutive shifts below the effective minimum.
    MinRestPeriodViolation,
    /// Weekly hours exceed the contract maximum.
    MaxWeeklyHoursViolation,
    /// More than the allowed consecutive working days.
    MaxConsecutiveDaysViolation,
    /// Weekly hours below the employment-type minimum.
    MinWeeklyHoursShortfall,
    /// A station/date has no assigned specialist (default-station) employee.
    SpecialistCoverageGap,
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            IssueCode::MissingPenaltyRules => "MISSING_PENALTY_RULES",
            IssueCode::MissingPolicy => "MISSING_POLICY",
            IssueCode::MissingContract => "MISSING_CONTRACT",
            IssueCode::MinShiftLengthViolation => "MIN_SHIFT_LENGTH_VIOLATION",
            IssueCode::MaxShiftSpanViolation => "MAX_SHIFT_SPAN_VIOLATION",
            IssueCode::HighPenaltyRate => "HIGH_PENALTY_RATE",
            IssueCode::MinRestPeriodViolation => "MIN_REST_PERIOD_VIOLATION",
            IssueCode::MaxWeeklyHoursViolation => "MAX_WEEKLY_HOURS_VIOLATION",
            IssueCode::MaxConsecutiveDaysViolation => "MAX_CONSECUTIVE_DAYS_VIOLATION",
            IssueCode::MinWeeklyHoursShortfall => "MIN_WEEKLY_HOURS_SHORTFALL",
            IssueCode::SpecialistCoverageGap => "SPECIALIST_COVERAGE_GAP",
        };
        write!(f, "{code}")
    }
}

/// One compliance finding against a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceIssue {
    /// The employee concerned, or `None` for store-level findings.
    #[serde(default)]
    pub employee_id: Option<String>,
    /// The issue code.
    pub code: IssueCode,
    /// The severity classification.
    pub severity: Severity,
    /// Structured details (shift index, measured values, thresholds).
    pub details: serde_json::Value,
}

/// The kind of correction a suggestion proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    /// Extend a shift's end time.
    ExtendShift,
    /// Shorten a shift's end time.
    ShortenShift,
    /// Move a shift's start and end.
    MoveShift,
    /// Reassign a shift to another employee.
    ReassignShift,
    /// Remove a shift.
    RemoveShift,
    /// Give the employee a rest day.
    AddRestDay,
    /// Assign the employee more hours.
    AssignMoreShifts,
}

/// The concrete change a suggestion proposes, when mechanically derivable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestedChange {
    /// Replace the shift's end time.
    NewEnd {
        /// The proposed end time.
        end: NaiveDateTime,
    },
    /// Replace the shift's start and end times.
    NewWindow {
        /// The proposed start time.
        start: NaiveDateTime,
        /// The proposed end time.
        end: NaiveDateTime,
    },
    /// Hand the shift to a different employee, when one is identified.
    Reassign {
        /// The substitute employee, when identified.
        employee_id: Option<String>,
    },
    /// Clear the employee's shifts on one date.
    RestDay {
        /// The proposed rest date.
        date: NaiveDate,
    },
    /// Assign this many additional hours across the week.
    AddHours {
        /// The shortfall to make up.
        hours: Decimal,
    },
}

/// A machine-applicable correction suggestion paired with an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSuggestion {
    /// The kind of correction proposed.
    pub suggestion_type: SuggestionType,
    /// The employee the suggestion concerns.
    pub employee_id: String,
    /// Index into the roster's shift list, when the change targets one shift.
    #[serde(default)]
    pub shift_index: Option<usize>,
    /// The concrete proposed change, when derivable.
    #[serde(default)]
    pub change: Option<SuggestedChange>,
    /// The issue this suggestion corrects.
    #[serde(default)]
    pub related_issue: Option<IssueCode>,
}

/// The result of validating a roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// True when no CRITICAL issues are present.
    pub passed: bool,
    /// All findings, in validator order.
    pub issues: Vec<ComplianceIssue>,
    /// Correction suggestions paired with the findings.
    pub suggestions: Vec<ComplianceSuggestion>,
    /// Human-readable summary.
    pub summary: String,
}

impl ComplianceReport {
    /// Returns true when any CRITICAL issue is present.
    pub fn has_critical(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    /// Counts issues of the given severity.
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Major);
        assert!(Severity::Major > Severity::Minor);
    }

    #[test]
    fn test_issue_code_display_matches_wire_format() {
        assert_eq!(
            IssueCode::MinShiftLengthViolation.to_string(),
            "MIN_SHIFT_LENGTH_VIOLATION"
        );
        assert_eq!(
            serde_json::to_string(&IssueCode::MinShiftLengthViolation).unwrap(),
            "\"MIN_SHIFT_LENGTH_VIOLATION\""
        );
        assert_eq!(
            IssueCode::MaxConsecutiveDaysViolation.to_string(),
            "MAX_CONSECUTIVE_DAYS_VIOLATION"
        );
    }

    #[test]
    fn test_report_has_critical() {
        let report = ComplianceReport {
            passed: false,
            issues: vec![
                ComplianceIssue {
                    employee_id: Some("e1".to_string()),
                    code: IssueCode::MinShiftLengthViolation,
                    severity: Severity::Critical,
                    details: serde_json::json!({}),
                },
                ComplianceIssue {
                    employee_id: Some("e2".to_string()),
                    code: IssueCode::MinWeeklyHoursShortfall,
                    severity: Severity::Major,
                    details: serde_json::json!({}),
                },
            ],
            suggestions: vec![],
            summary: String::new(),
        };

        assert!(report.has_critical());
        assert_eq!(report.count_by_severity(Severity::Critical), 1);
        assert_eq!(report.count_by_severity(Severity::Major), 1);
        assert_eq!(report.count_by_severity(Severity::Minor), 0);
    }

    #[test]
    fn test_suggested_change_serialization() {
        let change = SuggestedChange::NewEnd {
            end: chrono::NaiveDateTime::parse_from_str(
                "2025-12-08 12:00:00",
                "%Y-%m-%d %H:%M:%S",
            )
            .unwrap(),
        };
        let json = serde_json::to_string(&change).unwrap();
        assert!(json.contains("\"kind\":\"new_end\""));

        let deserialized: SuggestedChange = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, change);
    }

    #[test]
    fn test_suggestion_round_trip() {
        let suggestion = ComplianceSuggestion {
            suggestion_type: SuggestionType::RemoveShift,
            employee_id: "e1".to_string(),
            shift_index: None,
            change: None,
            related_issue: Some(IssueCode::MaxWeeklyHoursViolation),
        };

        let json = serde_json::to_string(&suggestion).unwrap();
        let deserialized: ComplianceSuggestion = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, suggestion);
    }
}
