//! Cost optimization.
//!
//! Estimates roster labor cost in penalty-weighted hours, applies
//! pre-validated compliance suggestions, and hunts for cheaper weekend
//! placements. Every structural change is speculative: it is committed
//! only after the injected validator confirms it introduces no CRITICAL
//! issue, so the optimizer can never trade a cost saving for a violation.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::models::{
    ComplianceReport, ComplianceSuggestion, EmployeeContract, EmploymentType, PenaltyRule, Roster,
};
use crate::scheduling::conflict::ConflictResolutionEngine;
use crate::scheduling::penalty_resolver::{resolve_penalty, weekday_number};
use crate::calendar;

/// Hour spread beyond which the roster is reported as unbalanced.
const HOUR_BALANCE_THRESHOLD: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// A compliance validator the optimizer consults before committing a change.
pub trait ComplianceCheck {
    /// Validates a candidate roster.
    fn check(&self, roster: &Roster) -> ComplianceReport;
}

/// A validator that approves every roster. Used when no compliance engine
/// is wired in; structural moves then rely on local guards only.
pub struct PassThroughValidator;

impl ComplianceCheck for PassThroughValidator {
    fn check(&self, _roster: &Roster) -> ComplianceReport {
        ComplianceReport {
            passed: true,
            issues: Vec::new(),
            suggestions: Vec::new(),
            summary: "validation skipped".to_string(),
        }
    }
}

/// The record of one speculative validation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationQuery {
    /// The change that was validated.
    pub description: String,
    /// Whether the candidate passed (no CRITICAL issues).
    pub passed: bool,
    /// Why the candidate was rejected, when it was.
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// The outcome of a cost-optimization pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// The optimized roster copy.
    pub roster: Roster,
    /// Penalty-weighted hour cost before optimization.
    pub initial_cost: Decimal,
    /// Penalty-weighted hour cost after optimization.
    pub final_cost: Decimal,
    /// Relative saving, as a percentage of the initial cost.
    pub savings_percent: Decimal,
    /// How many compliance suggestions were applied.
    pub suggestions_applied: u32,
    /// How many structural cost moves were committed.
    pub optimizations_applied: u32,
    /// Speculative validation rounds, in order.
    pub validation_queries: Vec<ValidationQuery>,
    /// Human-readable observations (hour imbalance, skipped moves).
    pub notes: Vec<String>,
    /// True when rostered hours are evenly spread across employees.
    pub hours_balanced: bool,
    /// Composite quality score, 0 to 100.
    pub score: Decimal,
}

/// Scores an optimization pass on a 0-100 scale.
///
/// Starts from a base of 50 and rewards savings (2 points per percent,
/// capped at 30), applied suggestions (5 each, capped at 15), committed
/// moves (3 each, capped at 10) and balanced hours (5). A pass that
/// changed nothing loses 10.
pub fn optimization_score(
    savings_percent: Decimal,
    suggestions_applied: u32,
    optimizations_applied: u32,
    hours_balanced: bool,
    modified: bool,
) -> Decimal {
    let mut score = Decimal::from(50);
    score += (savings_percent * Decimal::TWO).min(Decimal::from(30));
    score += Decimal::from(suggestions_applied * 5).min(Decimal::from(15));
    score += Decimal::from(optimizations_applied * 3).min(Decimal::from(10));
    if hours_balanced {
        score += Decimal::from(5);
    }
    if !modified {
        score -= Decimal::from(10);
    }
    score.clamp(Decimal::ZERO, Decimal::from(100))
}

/// Reduces roster cost without introducing compliance violations.
pub struct CostOptimizationEngine;

impl CostOptimizationEngine {
    /// Optimizes a copy of the roster.
    ///
    /// Runs three stages: apply the given pre-validated suggestions, then
    /// try moving Sunday shifts to Saturday and Saturday shifts to Friday
    /// in descending order of estimated saving, then report hour balance.
    /// Each candidate move is validated speculatively and dropped if it
    /// would introduce a CRITICAL issue.
    pub fn optimize<V: ComplianceCheck>(
        roster: &Roster,
        suggestions: &[ComplianceSuggestion],
        contracts: &[EmployeeContract],
        rules: &[PenaltyRule],
        region: Option<&str>,
        validator: &V,
    ) -> OptimizationResult {
        let employment = employment_by_employee(contracts);
        let initial_cost = Self::roster_cost(roster, contracts, rules, region);

        let mut notes = Vec::new();
        let mut validation_queries = Vec::new();

        let applied = ConflictResolutionEngine::apply_suggestions(roster, suggestions);
        let suggestions_applied = applied.resolved;
        if applied.unresolved > 0 {
            notes.push(format!(
                "{} suggestions could not be applied",
                applied.unresolved
            ));
        }
        let mut working = applied.roster;

        let mut optimizations_applied = 0u32;
        for (index, target_date, saving) in
            Self::candidate_moves(&working, &employment, rules, region)
        {
            let shift = &working.shifts[index];
            if working.assigned_on(&shift.employee_id, target_date) {
                continue;
            }
            let mut candidate = working.clone();
            let offset = Duration::days(1);
            candidate.shifts[index].start -= offset;
            candidate.shifts[index].end -= offset;

            let description = format!(
                "move {} from {} to {target_date} (est. saving {saving})",
                shift.employee_id,
                shift.date()
            );
            let report = validator.check(&candidate);
            if report.has_critical() {
                debug!(description = description.as_str(), "candidate move rejected");
                validation_queries.push(ValidationQuery {
                    description,
                    passed: false,
                    failure_reason: Some(report.summary),
                });
                continue;
            }
            validation_queries.push(ValidationQuery {
                description,
                passed: true,
                failure_reason: None,
            });
            working = candidate;
            optimizations_applied += 1;
        }

        let hours_balanced = Self::check_hour_balance(&working, &mut notes);

        let final_cost = Self::roster_cost(&working, contracts, rules, region);
        let savings_percent = if initial_cost > Decimal::ZERO {
            (initial_cost - final_cost) / initial_cost * Decimal::from(100)
        } else {
            Decimal::ZERO
        };
        let modified = suggestions_applied > 0 || optimizations_applied > 0;
        let score = optimization_score(
            savings_percent,
            suggestions_applied,
            optimizations_applied,
            hours_balanced,
            modified,
        );

        info!(
            %initial_cost,
            %final_cost,
            suggestions_applied,
            optimizations_applied,
            %score,
            "optimization pass complete"
        );

        OptimizationResult {
            roster: working,
            initial_cost,
            final_cost,
            savings_percent,
            suggestions_applied,
            optimizations_applied,
            validation_queries,
            notes,
            hours_balanced,
            score,
        }
    }

    /// Estimates roster cost as the sum of shift durations weighted by
    /// each shift's penalty multiplier.
    pub fn roster_cost(
        roster: &Roster,
        contracts: &[EmployeeContract],
        rules: &[PenaltyRule],
        region: Option<&str>,
    ) -> Decimal {
        let employment = employment_by_employee(contracts);
        roster
            .shifts
            .iter()
            .map(|shift| shift.duration_hours() * Self::shift_multiplier(shift, &employment, rules, region))
            .sum()
    }

    fn shift_multiplier(
        shift: &crate::models::Shift,
        employment: &HashMap<String, EmploymentType>,
        rules: &[PenaltyRule],
        region: Option<&str>,
    ) -> Decimal {
        let employment_type = employment
            .get(&shift.employee_id)
            .copied()
            .unwrap_or(EmploymentType::Casual);
        let is_holiday = calendar::is_public_holiday(shift.date(), region);
        resolve_penalty(
            shift.date(),
            shift.start.time(),
            shift.end.time(),
            employment_type,
            rules,
            is_holiday,
        )
        .multiplier
    }

    /// Lists weekend shifts whose previous day carries a cheaper rate,
    /// sorted by estimated saving descending. Only positive savings make
    /// the list. Shifts on public holidays are left where they are.
    fn candidate_moves(
        roster: &Roster,
        employment: &HashMap<String, EmploymentType>,
        rules: &[PenaltyRule],
        region: Option<&str>,
    ) -> Vec<(usize, chrono::NaiveDate, Decimal)> {
        let mut moves = Vec::new();
        for (index, shift) in roster.shifts.iter().enumerate() {
            let dow = weekday_number(shift.day_of_week());
            // Sunday moves back to Saturday, Saturday back to Friday.
            if dow != 0 && dow != 6 {
                continue;
            }
            if calendar::is_public_holiday(shift.date(), region) {
                continue;
            }
            let target_date = shift.date() - Duration::days(1);
            if calendar::is_public_holiday(target_date, region) {
                continue;
            }
            let current = Self::shift_multiplier(shift, employment, rules, region);
            let employment_type = employment
                .get(&shift.employee_id)
                .copied()
                .unwrap_or(EmploymentType::Casual);
            let proposed = resolve_penalty(
                target_date,
                shift.start.time(),
                shift.end.time(),
                employment_type,
                rules,
                false,
            )
            .multiplier;
            let saving = (current - proposed) * shift.duration_hours();
            if saving > Decimal::ZERO {
                moves.push((index, target_date, saving));
            }
        }
        moves.sort_by(|a, b| b.2.cmp(&a.2));
        moves
    }

    fn check_hour_balance(roster: &Roster, notes: &mut Vec<String>) -> bool {
        let mut totals: HashMap<&str, Decimal> = HashMap::new();
        for shift in &roster.shifts {
            *totals.entry(shift.employee_id.as_str()).or_default() += shift.duration_hours();
        }
        if totals.len() < 2 {
            return true;
        }
        let max = totals.values().copied().max().unwrap_or_default();
        let min = totals.values().copied().min().unwrap_or_default();
        let spread = max - min;
        if spread > HOUR_BALANCE_THRESHOLD {
            notes.push(format!(
                "rostered hours are unbalanced: spread of {spread}h between employees"
            ));
            return false;
        }
        true
    }
}

fn employment_by_employee(contracts: &[EmployeeContract]) -> HashMap<String, EmploymentType> {
    contracts
        .iter()
        .map(|c| (c.employee_id.clone(), c.employment_type))
        .collect()
}
