//! End-to-end pipeline tests driving the engines the way the orchestrator
//! wires them together.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use roster_engine::config::{SchedulePolicy, ShiftCodeTable, default_penalty_rules};
use roster_engine::error::{EngineError, EngineResult};
use roster_engine::models::{
    AvailabilityRecord, CoverageGap, EmployeeContract, EmploymentType, IssueCode, PenaltyRule,
    PeriodType, Roster, Shift, SkillRecord, StaffRequirement, SuggestionType,
};
use roster_engine::orchestration::{Orchestrator, RunMode, RunStatus};
use roster_engine::providers::{DataProvider, InMemoryDataProvider};
use roster_engine::scheduling::{ComplianceEngine, ConflictResolutionEngine};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 8).unwrap()
}

fn make_datetime(date_str: &str, time_str: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(&format!("{} {}", date_str, time_str), "%Y-%m-%d %H:%M:%S")
        .unwrap()
}

fn casual_contract(employee: &str) -> EmployeeContract {
    EmployeeContract {
        employee_id: employee.to_string(),
        employment_type: EmploymentType::Casual,
        max_hours_week: None,
        min_hours_between_shifts: None,
        default_station_code: None,
    }
}

// ==========================================================================
// E2E-001: short casual shift is flagged, corrected, and re-validates clean
// ==========================================================================
#[test]
fn test_e2e_001_short_casual_shift_corrected() {
    let mut roster = Roster::empty("store-1", monday());
    roster.shifts.push(
        Shift::new(
            "e1",
            make_datetime("2025-12-09", "09:00:00"),
            make_datetime("2025-12-09", "11:00:00"),
            "COUNTER",
        )
        .unwrap(),
    );
    let contracts = [casual_contract("e1")];
    let policy = SchedulePolicy::default();
    let rules = default_penalty_rules();

    let report = ComplianceEngine::validate(
        &roster,
        &contracts,
        Some(&policy),
        Some(&rules),
        Some("VIC"),
    );
    assert!(!report.passed);
    assert!(
        report
            .issues
            .iter()
            .any(|i| i.code == IssueCode::MinShiftLengthViolation)
    );
    let extend = report
        .suggestions
        .iter()
        .find(|s| s.suggestion_type == SuggestionType::ExtendShift)
        .expect("extend suggestion");
    assert_eq!(extend.employee_id, "e1");

    let outcome = ConflictResolutionEngine::apply_suggestions(&roster, &report.suggestions);
    assert!(outcome.resolved >= 1);
    assert_eq!(
        outcome.roster.shifts[0].end,
        make_datetime("2025-12-09", "12:00:00")
    );

    let revalidated = ComplianceEngine::validate(
        &outcome.roster,
        &contracts,
        Some(&policy),
        Some(&rules),
        Some("VIC"),
    );
    assert!(revalidated.passed);
    assert!(!revalidated.has_critical());
}

// ==========================================================================
// E2E-002: three-person gap with one eligible candidate
// ==========================================================================
#[test]
fn test_e2e_002_coverage_gap_partial_resolution() {
    let roster = Roster::empty("store-1", monday());
    let gaps = [CoverageGap {
        date: monday(),
        station_id: 3,
        station_code: Some("KITCHEN".to_string()),
        shortfall: 3,
    }];
    let availability = [AvailabilityRecord {
        employee_id: "e1".to_string(),
        date: monday(),
        shift_code: "1F".to_string(),
        start_time: None,
        end_time: None,
        station_id: None,
    }];
    let skills = [SkillRecord {
        employee_id: "e1".to_string(),
        skills: vec!["KITCHEN".to_string()],
    }];
    let contracts = [casual_contract("e1")];

    let outcome = ConflictResolutionEngine::resolve_coverage_gaps(
        &roster,
        &gaps,
        &availability,
        &skills,
        &contracts,
        &ShiftCodeTable::standard(),
    );

    assert_eq!(outcome.resolved, 1);
    assert_eq!(outcome.unresolved, 2);
    assert!(outcome.requires_human_review);
}

fn clean_week_provider() -> InMemoryDataProvider {
    // e1 (full-time) Monday-Thursday at 9h/day, e2 (part-time)
    // Friday-Sunday; both inside their weekly hour bands.
    let mut records: Vec<AvailabilityRecord> = (0..4)
        .map(|offset| AvailabilityRecord {
            employee_id: "e1".to_string(),
            date: monday() + Duration::days(offset),
            shift_code: "1F".to_string(),
            start_time: None,
            end_time: None,
            station_id: None,
        })
        .collect();
    records.extend((4..7).map(|offset| AvailabilityRecord {
        employee_id: "e2".to_string(),
        date: monday() + Duration::days(offset),
        shift_code: "1F".to_string(),
        start_time: None,
        end_time: None,
        station_id: None,
    }));

    InMemoryDataProvider {
        availability: records,
        skills: vec![
            SkillRecord {
                employee_id: "e1".to_string(),
                skills: vec!["COUNTER".to_string()],
            },
            SkillRecord {
                employee_id: "e2".to_string(),
                skills: vec!["COUNTER".to_string()],
            },
        ],
        contracts: vec![
            EmployeeContract {
                employee_id: "e1".to_string(),
                employment_type: EmploymentType::FullTime,
                max_hours_week: None,
                min_hours_between_shifts: None,
                default_station_code: None,
            },
            EmployeeContract {
                employee_id: "e2".to_string(),
                employment_type: EmploymentType::PartTime,
                max_hours_week: None,
                min_hours_between_shifts: None,
                default_station_code: None,
            },
        ],
        requirements: vec![StaffRequirement {
            station_id: 4,
            station_code: Some("COUNTER".to_string()),
            period_type: PeriodType::Normal,
            required_staff: 1,
        }],
        policy: Some(SchedulePolicy::default()),
        penalty_rules: Some(default_penalty_rules()),
    }
}

// ==========================================================================
// E2E-003: full dynamic run over a clean week ends ok
// ==========================================================================
#[tokio::test]
async fn test_e2e_003_dynamic_run_clean_week() {
    let orchestrator = Orchestrator::new(clean_week_provider());
    let result = orchestrator
        .generate_roster("store-1", monday(), RunMode::Dynamic)
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Ok);
    assert_eq!(result.roster.shifts.len(), 7);
    let compliance = result.compliance.expect("compliance ran");
    assert!(compliance.passed);
    assert!(result.optimization.is_some());
    assert!(!result.agent_trace.is_empty());
}

// ==========================================================================
// E2E-004: fallback run over the same week also ends ok
// ==========================================================================
#[tokio::test]
async fn test_e2e_004_fallback_run_clean_week() {
    let orchestrator = Orchestrator::new(clean_week_provider());
    let result = orchestrator
        .generate_roster("store-1", monday(), RunMode::Fallback)
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Ok);
    assert_eq!(result.roster.shifts.len(), 7);
    assert!(result.conflict_resolution.is_none());
}

// ==========================================================================
// E2E-005: missing penalty rules escalate instead of crashing
// ==========================================================================
#[tokio::test]
async fn test_e2e_005_missing_penalty_rules_escalates() {
    let provider = InMemoryDataProvider {
        penalty_rules: None,
        ..clean_week_provider()
    };
    let orchestrator = Orchestrator::new(provider);
    let result = orchestrator
        .generate_roster("store-1", monday(), RunMode::Dynamic)
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::RequiresHumanReview);
    let compliance = result.compliance.expect("compliance ran");
    assert!(
        compliance
            .issues
            .iter()
            .any(|i| i.code == IssueCode::MissingPenaltyRules)
    );
}

/// A provider whose every lookup fails.
struct BrokenProvider;

impl DataProvider for BrokenProvider {
    async fn availability(
        &self,
        _store_id: &str,
        _from: NaiveDate,
        _to: NaiveDate,
    ) -> EngineResult<Vec<AvailabilityRecord>> {
        Err(EngineError::ProviderError {
            provider: "availability".to_string(),
            message: "connection refused".to_string(),
        })
    }

    async fn skills(&self, _employee_ids: &[String]) -> EngineResult<Vec<SkillRecord>> {
        Err(EngineError::ProviderError {
            provider: "skills".to_string(),
            message: "connection refused".to_string(),
        })
    }

    async fn contracts(
        &self,
        _store_id: &str,
        _employee_ids: &[String],
    ) -> EngineResult<Vec<EmployeeContract>> {
        Err(EngineError::ProviderError {
            provider: "contracts".to_string(),
            message: "connection refused".to_string(),
        })
    }

    async fn staffing_requirements(
        &self,
        _store_id: &str,
    ) -> EngineResult<Vec<StaffRequirement>> {
        Err(EngineError::ProviderError {
            provider: "staffing_requirements".to_string(),
            message: "connection refused".to_string(),
        })
    }

    async fn policy(&self, _store_id: &str) -> EngineResult<Option<SchedulePolicy>> {
        Err(EngineError::ProviderError {
            provider: "policy".to_string(),
            message: "connection refused".to_string(),
        })
    }

    async fn penalty_rules(&self, _store_id: &str) -> EngineResult<Option<Vec<PenaltyRule>>> {
        Err(EngineError::ProviderError {
            provider: "penalty_rules".to_string(),
            message: "connection refused".to_string(),
        })
    }
}

// ==========================================================================
// E2E-006: total provider failure degrades to an empty-roster verdict
// ==========================================================================
#[tokio::test]
async fn test_e2e_006_broken_provider_degrades() {
    let orchestrator = Orchestrator::new(BrokenProvider);
    let result = orchestrator
        .generate_roster("store-1", monday(), RunMode::Dynamic)
        .await
        .unwrap();

    assert!(result.roster.shifts.is_empty());
    // Degraded-input trace entries precede any engine step.
    assert!(
        result
            .agent_trace
            .iter()
            .any(|entry| entry.action.contains("degraded input"))
    );
    assert!(matches!(
        result.status,
        RunStatus::RequiresHumanReview | RunStatus::Ok
    ));
}
