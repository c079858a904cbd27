//! Orchestration planning.
//!
//! [`decide`] is a pure function from run state and flags to the next step.
//! The iteration-cap check short-circuits everything else, which makes the
//! cap an unconditional termination guarantee.

use serde::{Deserialize, Serialize};

use crate::models::{ComplianceReport, Roster};
use crate::orchestration::trace::{OrchestrationState, WorkerKind};

/// Bounded retries after a failed final validation.
const MAX_FINAL_VALIDATION_RETRIES: u32 = 2;

/// What the planner wants to happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    /// Dispatch to an engine.
    Worker(WorkerKind),
    /// The run is finished.
    Done,
    /// Escalate to a human.
    HumanReview,
}

/// A planner decision with its rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerDecision {
    /// The next step.
    pub next: NextStep,
    /// Why this step was chosen.
    pub reason: String,
}

impl PlannerDecision {
    fn worker(kind: WorkerKind, reason: impl Into<String>) -> Self {
        Self {
            next: NextStep::Worker(kind),
            reason: reason.into(),
        }
    }

    fn done(reason: impl Into<String>) -> Self {
        Self {
            next: NextStep::Done,
            reason: reason.into(),
        }
    }

    fn human_review(reason: impl Into<String>) -> Self {
        Self {
            next: NextStep::HumanReview,
            reason: reason.into(),
        }
    }
}

/// The roster-quality flags the planner decides on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerFlags {
    /// Compliance found issues of any severity.
    pub has_issues: bool,
    /// Compliance found CRITICAL issues.
    pub has_critical: bool,
    /// Unapplied correction suggestions exist.
    pub has_suggestions: bool,
    /// Unresolved coverage gaps exist.
    pub has_gaps: bool,
    /// Cost optimization already ran this run.
    pub optimization_attempted: bool,
    /// Failed final-validation rounds so far.
    pub final_validation_retries: u32,
}

/// Decides the next step for a run.
///
/// The iteration cap overrides every state rule: once `iteration_count`
/// reaches `max_iterations` the answer is human review, whatever the state.
pub fn decide(
    state: OrchestrationState,
    flags: &PlannerFlags,
    iteration_count: u32,
    max_iterations: u32,
) -> PlannerDecision {
    if iteration_count >= max_iterations {
        return PlannerDecision::human_review(format!(
            "iteration cap reached ({iteration_count}/{max_iterations})"
        ));
    }

    match state {
        OrchestrationState::Initial => {
            PlannerDecision::worker(WorkerKind::RosterGeneration, "no roster exists yet")
        }
        OrchestrationState::RosterGenerated => {
            PlannerDecision::worker(WorkerKind::Compliance, "draft roster needs validation")
        }
        OrchestrationState::ComplianceValidated => {
            if !flags.has_issues && !flags.has_suggestions && !flags.has_gaps {
                PlannerDecision::worker(WorkerKind::Optimization, "roster is clean; optimize cost")
            } else {
                PlannerDecision::worker(
                    WorkerKind::Conflict,
                    "suggestions or gaps remain after validation",
                )
            }
        }
        OrchestrationState::ComplianceHasIssues => {
            if flags.has_critical && !flags.has_suggestions {
                PlannerDecision::human_review(
                    "critical issues with no machine-applicable corrections",
                )
            } else {
                PlannerDecision::worker(WorkerKind::Conflict, "issues have applicable corrections")
            }
        }
        OrchestrationState::ConflictsResolved => {
            if flags.has_gaps || flags.has_critical {
                PlannerDecision::human_review("gaps or critical issues survived resolution")
            } else if !flags.optimization_attempted {
                PlannerDecision::worker(WorkerKind::Optimization, "conflicts resolved; optimize cost")
            } else {
                PlannerDecision::worker(WorkerKind::Compliance, "re-validate after resolution")
            }
        }
        OrchestrationState::Optimized => {
            PlannerDecision::worker(WorkerKind::Compliance, "final check after optimization")
        }
        OrchestrationState::FinalValidationPassed => {
            PlannerDecision::done("final validation passed")
        }
        OrchestrationState::FinalValidationFailed => {
            if flags.has_critical {
                PlannerDecision::human_review("final validation failed with critical issues")
            } else if flags.final_validation_retries >= MAX_FINAL_VALIDATION_RETRIES {
                PlannerDecision::human_review("final-validation retry budget exhausted")
            } else {
                PlannerDecision::worker(WorkerKind::Conflict, "retry resolution after failed final check")
            }
        }
        OrchestrationState::RequiresHumanReview | OrchestrationState::Completed => {
            PlannerDecision::done("run already terminal")
        }
    }
}

/// A roster-quality verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityAssessment {
    /// Quality score, 0 to 100.
    pub score: u32,
    /// Whether the roster is good enough to proceed without review.
    pub can_proceed: bool,
}

/// Scores a roster's quality from its shape and compliance report.
///
/// Starts at 100; an empty roster costs 50, any critical issue 40, any
/// major issue 20, unresolved coverage gaps 30. The floor is 0.
/// `can_proceed` requires a score of at least 60 and no critical issues.
pub fn assess_roster_quality(
    roster: &Roster,
    report: &ComplianceReport,
    unresolved_gaps: u32,
) -> QualityAssessment {
    let mut penalty = 0u32;
    if roster.shifts.is_empty() {
        penalty += 50;
    }
    let has_critical = report.has_critical();
    if has_critical {
        penalty += 40;
    }
    if report.count_by_severity(crate::models::Severity::Major) > 0 {
        penalty += 20;
    }
    if unresolved_gaps > 0 {
        penalty += 30;
    }
    let score = 100u32.saturating_sub(penalty);
    QualityAssessment {
        score,
        can_proceed: score >= 60 && !has_critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComplianceIssue, IssueCode, Severity, Shift};
    use chrono::{NaiveDate, NaiveDateTime};
    use proptest::prelude::*;

    fn report_with(severities: &[Severity]) -> ComplianceReport {
        ComplianceReport {
            passed: !severities.contains(&Severity::Critical),
            issues: severities
                .iter()
                .map(|&severity| ComplianceIssue {
                    employee_id: None,
                    code: IssueCode::MinRestPeriodViolation,
                    severity,
                    details: serde_json::json!({}),
                })
                .collect(),
            suggestions: vec![],
            summary: String::new(),
        }
    }

    fn roster_with_one_shift() -> Roster {
        let mut roster = Roster::empty("store-1", NaiveDate::from_ymd_opt(2025, 12, 8).unwrap());
        roster.shifts.push(
            Shift::new(
                "e1",
                NaiveDateTime::parse_from_str("2025-12-08 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
                NaiveDateTime::parse_from_str("2025-12-08 17:00:00", "%Y-%m-%d %H:%M:%S").unwrap(),
                "COUNTER",
            )
            .unwrap(),
        );
        roster
    }

    // ==========================================================================
    // PLN-001: the happy-path transition chain
    // ==========================================================================
    #[test]
    fn test_pln_001_happy_path_chain() {
        let mut flags = PlannerFlags::default();

        let d = decide(OrchestrationState::Initial, &flags, 0, 5);
        assert_eq!(d.next, NextStep::Worker(WorkerKind::RosterGeneration));

        let d = decide(OrchestrationState::RosterGenerated, &flags, 1, 5);
        assert_eq!(d.next, NextStep::Worker(WorkerKind::Compliance));

        let d = decide(OrchestrationState::ComplianceValidated, &flags, 2, 5);
        assert_eq!(d.next, NextStep::Worker(WorkerKind::Optimization));

        flags.optimization_attempted = true;
        let d = decide(OrchestrationState::Optimized, &flags, 3, 5);
        assert_eq!(d.next, NextStep::Worker(WorkerKind::Compliance));

        let d = decide(OrchestrationState::FinalValidationPassed, &flags, 4, 5);
        assert_eq!(d.next, NextStep::Done);
    }

    // ==========================================================================
    // PLN-002: validated-with-suggestions routes to conflict resolution
    // ==========================================================================
    #[test]
    fn test_pln_002_suggestions_route_to_conflict() {
        let flags = PlannerFlags {
            has_suggestions: true,
            ..Default::default()
        };
        let d = decide(OrchestrationState::ComplianceValidated, &flags, 1, 5);
        assert_eq!(d.next, NextStep::Worker(WorkerKind::Conflict));
    }

    // ==========================================================================
    // PLN-003: critical without suggestions escalates immediately
    // ==========================================================================
    #[test]
    fn test_pln_003_critical_without_suggestions_escalates() {
        let flags = PlannerFlags {
            has_issues: true,
            has_critical: true,
            ..Default::default()
        };
        let d = decide(OrchestrationState::ComplianceHasIssues, &flags, 1, 5);
        assert_eq!(d.next, NextStep::HumanReview);

        let with_suggestions = PlannerFlags {
            has_suggestions: true,
            ..flags
        };
        let d = decide(OrchestrationState::ComplianceHasIssues, &with_suggestions, 1, 5);
        assert_eq!(d.next, NextStep::Worker(WorkerKind::Conflict));
    }

    // ==========================================================================
    // PLN-004: conflicts-resolved branching
    // ==========================================================================
    #[test]
    fn test_pln_004_conflicts_resolved_branches() {
        let clean = PlannerFlags::default();
        let d = decide(OrchestrationState::ConflictsResolved, &clean, 2, 5);
        assert_eq!(d.next, NextStep::Worker(WorkerKind::Optimization));

        let after_optimization = PlannerFlags {
            optimization_attempted: true,
            ..Default::default()
        };
        let d = decide(OrchestrationState::ConflictsResolved, &after_optimization, 2, 5);
        assert_eq!(d.next, NextStep::Worker(WorkerKind::Compliance));

        let gaps_remain = PlannerFlags {
            has_gaps: true,
            ..Default::default()
        };
        let d = decide(OrchestrationState::ConflictsResolved, &gaps_remain, 2, 5);
        assert_eq!(d.next, NextStep::HumanReview);
    }

    // ==========================================================================
    // PLN-005: failed final validation retries at most twice
    // ==========================================================================
    #[test]
    fn test_pln_005_final_validation_retry_budget() {
        let retryable = PlannerFlags {
            has_issues: true,
            final_validation_retries: 1,
            optimization_attempted: true,
            ..Default::default()
        };
        let d = decide(OrchestrationState::FinalValidationFailed, &retryable, 3, 10);
        assert_eq!(d.next, NextStep::Worker(WorkerKind::Conflict));

        let exhausted = PlannerFlags {
            final_validation_retries: 2,
            ..retryable
        };
        let d = decide(OrchestrationState::FinalValidationFailed, &exhausted, 3, 10);
        assert_eq!(d.next, NextStep::HumanReview);

        let critical = PlannerFlags {
            has_critical: true,
            final_validation_retries: 0,
            ..retryable
        };
        let d = decide(OrchestrationState::FinalValidationFailed, &critical, 3, 10);
        assert_eq!(d.next, NextStep::HumanReview);
    }

    // ==========================================================================
    // PLN-006: quality assessment scoring
    // ==========================================================================
    #[test]
    fn test_pln_006_quality_assessment() {
        let roster = roster_with_one_shift();

        let clean = assess_roster_quality(&roster, &report_with(&[]), 0);
        assert_eq!(clean.score, 100);
        assert!(clean.can_proceed);

        let major_only = assess_roster_quality(&roster, &report_with(&[Severity::Major]), 0);
        assert_eq!(major_only.score, 80);
        assert!(major_only.can_proceed);

        let critical = assess_roster_quality(&roster, &report_with(&[Severity::Critical]), 0);
        assert_eq!(critical.score, 60);
        assert!(!critical.can_proceed);

        let empty = Roster::empty("store-1", NaiveDate::from_ymd_opt(2025, 12, 8).unwrap());
        let worst = assess_roster_quality(
            &empty,
            &report_with(&[Severity::Critical, Severity::Major]),
            2,
        );
        assert_eq!(worst.score, 0);
        assert!(!worst.can_proceed);
    }

    proptest! {
        // ======================================================================
        // PLN-007: the iteration cap always yields human review
        // ======================================================================
        #[test]
        fn prop_iteration_cap_always_escalates(
            state_index in 0usize..10,
            has_issues in proptest::bool::ANY,
            has_critical in proptest::bool::ANY,
            has_suggestions in proptest::bool::ANY,
            has_gaps in proptest::bool::ANY,
            optimization_attempted in proptest::bool::ANY,
            retries in 0u32..4,
            over in 0u32..3,
        ) {
            let states = [
                OrchestrationState::Initial,
                OrchestrationState::RosterGenerated,
                OrchestrationState::ComplianceValidated,
                OrchestrationState::ComplianceHasIssues,
                OrchestrationState::ConflictsResolved,
                OrchestrationState::Optimized,
                OrchestrationState::FinalValidationPassed,
                OrchestrationState::FinalValidationFailed,
                OrchestrationState::RequiresHumanReview,
                OrchestrationState::Completed,
            ];
            let flags = PlannerFlags {
                has_issues,
                has_critical,
                has_suggestions,
                has_gaps,
                optimization_attempted,
                final_validation_retries: retries,
            };
            let decision = decide(states[state_index], &flags, 5 + over, 5);
            prop_assert_eq!(decision.next, NextStep::HumanReview);
        }
    }
}
