//! Conflict resolution.
//!
//! Applies compliance suggestions to a roster and fills coverage gaps with
//! substitute employees. Every operation works on a defensive copy of the
//! caller's roster. Failures to apply an individual suggestion are local:
//! they increment the unresolved count and set the human-review flag, they
//! never abort the run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

use crate::config::ShiftCodeTable;
use crate::models::{
    AvailabilityRecord, ComplianceIssue, ComplianceSuggestion, CoverageGap, EmployeeContract,
    Roster, Shift, SkillRecord, SuggestedChange, SuggestionType,
};

/// The record of one attempted resolution step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionAction {
    /// What was attempted.
    pub description: String,
    /// Whether the attempt succeeded.
    pub success: bool,
}

/// The outcome of a conflict-resolution operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    /// The updated roster copy.
    pub roster: Roster,
    /// How many suggestions/gap positions were resolved.
    pub resolved: u32,
    /// How many could not be resolved.
    pub unresolved: u32,
    /// A success/failure record per attempt.
    pub actions: Vec<ResolutionAction>,
    /// Human-readable warnings.
    pub warnings: Vec<String>,
    /// True when anything remains unresolved.
    pub requires_human_review: bool,
}

impl ResolutionOutcome {
    fn new(roster: Roster) -> Self {
        Self {
            roster,
            resolved: 0,
            unresolved: 0,
            actions: Vec::new(),
            warnings: Vec::new(),
            requires_human_review: false,
        }
    }

    fn record(&mut self, description: String, success: bool) {
        if success {
            self.resolved += 1;
        } else {
            self.unresolved += 1;
        }
        self.actions.push(ResolutionAction {
            description,
            success,
        });
    }

    fn finish(mut self) -> Self {
        self.requires_human_review = self.unresolved > 0;
        self
    }

    /// Merges a second outcome into this one, keeping the later roster.
    pub fn merge(mut self, other: ResolutionOutcome) -> Self {
        self.roster = other.roster;
        self.resolved += other.resolved;
        self.unresolved += other.unresolved;
        self.actions.extend(other.actions);
        self.warnings.extend(other.warnings);
        self.requires_human_review = self.requires_human_review || other.requires_human_review;
        self
    }
}

/// Applies suggestions and fills coverage gaps.
pub struct ConflictResolutionEngine;

impl ConflictResolutionEngine {
    /// Applies compliance suggestions to a copy of the roster.
    ///
    /// Removals are collected in a pending-removal index set and filtered
    /// once at the end, so shift indices stay valid for every suggestion in
    /// the batch. A `REMOVE_SHIFT` suggestion without an explicit index
    /// targets the employee's last chronological shift. An out-of-range
    /// index is a local failure, never an error.
    pub fn apply_suggestions(
        roster: &Roster,
        suggestions: &[ComplianceSuggestion],
    ) -> ResolutionOutcome {
        let mut outcome = ResolutionOutcome::new(roster.clone());
        let mut pending_removals: BTreeSet<usize> = BTreeSet::new();

        for suggestion in suggestions {
            let applied = Self::apply_one(&mut outcome.roster, &mut pending_removals, suggestion);
            match applied {
                Ok(description) => outcome.record(description, true),
                Err(reason) => {
                    warn!(
                        employee_id = suggestion.employee_id.as_str(),
                        reason = reason.as_str(),
                        "suggestion could not be applied"
                    );
                    outcome.warnings.push(reason.clone());
                    outcome.record(reason, false);
                }
            }
        }

        if !pending_removals.is_empty() {
            let mut index = 0;
            outcome.roster.shifts.retain(|_| {
                let keep = !pending_removals.contains(&index);
                index += 1;
                keep
            });
        }

        outcome.finish()
    }

    fn apply_one(
        roster: &mut Roster,
        pending_removals: &mut BTreeSet<usize>,
        suggestion: &ComplianceSuggestion,
    ) -> Result<String, String> {
        let employee = &suggestion.employee_id;
        match suggestion.suggestion_type {
            SuggestionType::ExtendShift | SuggestionType::ShortenShift => {
                let index = Self::existing_index(roster, suggestion)?;
                let Some(SuggestedChange::NewEnd { end }) = suggestion.change else {
                    return Err(format!(
                        "{:?} for {employee} has no proposed end time",
                        suggestion.suggestion_type
                    ));
                };
                if end <= roster.shifts[index].start {
                    return Err(format!(
                        "proposed end {end} for {employee} precedes the shift start"
                    ));
                }
                roster.shifts[index].end = end;
                Ok(format!("adjusted shift {index} of {employee} to end {end}"))
            }
            SuggestionType::MoveShift => {
                let index = Self::existing_index(roster, suggestion)?;
                let Some(SuggestedChange::NewWindow { start, end }) = suggestion.change else {
                    return Err(format!("MOVE_SHIFT for {employee} has no proposed window"));
                };
                if start >= end {
                    return Err(format!("proposed window for {employee} is empty"));
                }
                roster.shifts[index].start = start;
                roster.shifts[index].end = end;
                Ok(format!("moved shift {index} of {employee} to {start}"))
            }
            SuggestionType::ReassignShift => {
                let index = Self::existing_index(roster, suggestion)?;
                let Some(SuggestedChange::Reassign {
                    employee_id: Some(ref substitute),
                }) = suggestion.change
                else {
                    return Err(format!(
                        "REASSIGN_SHIFT for {employee} names no substitute employee"
                    ));
                };
                roster.shifts[index].employee_id = substitute.clone();
                Ok(format!(
                    "reassigned shift {index} from {employee} to {substitute}"
                ))
            }
            SuggestionType::RemoveShift => {
                let index = match suggestion.shift_index {
                    Some(index) => {
                        Self::existing_index(roster, suggestion)?;
                        index
                    }
                    // Autonomous choice: the employee's last chronological shift.
                    None => roster
                        .shifts_for_employee(employee)
                        .last()
                        .map(|(index, _)| *index)
                        .ok_or_else(|| format!("{employee} has no shifts to remove"))?,
                };
                pending_removals.insert(index);
                Ok(format!("marked shift {index} of {employee} for removal"))
            }
            SuggestionType::AddRestDay => {
                let Some(SuggestedChange::RestDay { date }) = suggestion.change else {
                    return Err(format!("ADD_REST_DAY for {employee} names no date"));
                };
                let indices: Vec<usize> = roster
                    .shifts
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.employee_id == *employee && s.date() == date)
                    .map(|(i, _)| i)
                    .collect();
                if indices.is_empty() {
                    return Err(format!("{employee} has no shifts on {date} to clear"));
                }
                pending_removals.extend(indices);
                Ok(format!("cleared {date} for {employee} as a rest day"))
            }
            SuggestionType::AssignMoreShifts => Err(format!(
                "ASSIGN_MORE_SHIFTS for {employee} requires staffing data; escalating"
            )),
        }
    }

    fn existing_index(
        roster: &Roster,
        suggestion: &ComplianceSuggestion,
    ) -> Result<usize, String> {
        let index = suggestion.shift_index.ok_or_else(|| {
            format!(
                "{:?} for {} has no shift index",
                suggestion.suggestion_type, suggestion.employee_id
            )
        })?;
        if index >= roster.shifts.len() {
            return Err(format!(
                "shift index {index} for {} is out of range",
                suggestion.employee_id
            ));
        }
        Ok(index)
    }

    /// Fills coverage gaps with substitute employees.
    ///
    /// Candidates must be available on the gap date, not already assigned
    /// that date (counted per date, not from a weekly aggregate), within
    /// their weekly-hour cap, and skill-matched to the station (the
    /// universal role and absent skill records both grant access).
    /// Candidates with fewer rostered hours are preferred. Residual
    /// shortfall is reported as a warning and counted unresolved.
    pub fn resolve_coverage_gaps(
        roster: &Roster,
        gaps: &[CoverageGap],
        availability: &[AvailabilityRecord],
        skills: &[SkillRecord],
        contracts: &[EmployeeContract],
        shift_codes: &ShiftCodeTable,
    ) -> ResolutionOutcome {
        let mut outcome = ResolutionOutcome::new(roster.clone());

        let skills_by_employee: HashMap<&str, &SkillRecord> = skills
            .iter()
            .map(|s| (s.employee_id.as_str(), s))
            .collect();
        let contracts_by_employee: HashMap<&str, &EmployeeContract> = contracts
            .iter()
            .map(|c| (c.employee_id.as_str(), c))
            .collect();

        for gap in gaps {
            let station = gap
                .station_code
                .clone()
                .unwrap_or_else(|| gap.station_id.to_string());

            let mut filled = 0u32;
            for _ in 0..gap.shortfall {
                let mut candidates: Vec<&AvailabilityRecord> = availability
                    .iter()
                    .filter(|a| a.date == gap.date && a.is_available())
                    .filter(|a| !outcome.roster.assigned_on(&a.employee_id, gap.date))
                    .filter(|a| {
                        skills_by_employee
                            .get(a.employee_id.as_str())
                            .map(|record| record.can_work(&station))
                            .unwrap_or(true)
                    })
                    .filter(|a| {
                        let hours = shift_codes.window(&a.shift_code).hours;
                        let worked = outcome.roster.total_hours_for(&a.employee_id);
                        let cap = contracts_by_employee
                            .get(a.employee_id.as_str())
                            .map(|c| c.effective_max_hours())
                            .unwrap_or_else(|| {
                                EmployeeContract::fallback(&a.employee_id).effective_max_hours()
                            });
                        worked + hours <= cap
                    })
                    .collect();

                candidates
                    .sort_by_key(|a| outcome.roster.total_hours_for(&a.employee_id));

                let Some(record) = candidates.first() else {
                    break;
                };
                let window = shift_codes.window(&record.shift_code);
                let start = record.start_time.unwrap_or(window.start);
                let end = record.end_time.unwrap_or(window.end);
                match Shift::new(
                    &record.employee_id,
                    gap.date.and_time(start),
                    gap.date.and_time(end),
                    &station,
                ) {
                    Ok(mut shift) => {
                        shift.station_id = Some(gap.station_id);
                        shift.shift_code = Some(record.shift_code.clone());
                        info!(
                            employee_id = record.employee_id.as_str(),
                            station = station.as_str(),
                            date = %gap.date,
                            "filled coverage gap"
                        );
                        outcome.record(
                            format!(
                                "assigned {} to {station} on {}",
                                record.employee_id, gap.date
                            ),
                            true,
                        );
                        outcome.roster.shifts.push(shift);
                        filled += 1;
                    }
                    Err(e) => {
                        outcome.warnings.push(format!(
                            "could not build substitute shift for {}: {e}",
                            record.employee_id
                        ));
                        break;
                    }
                }
            }

            let residual = gap.shortfall - filled;
            if residual > 0 {
                outcome.warnings.push(format!(
                    "station {station} on {}: {residual} positions still unfilled",
                    gap.date
                ));
                outcome.unresolved += residual;
            }
        }

        outcome.finish()
    }

    /// Converts externally identified issues into the resolution shape,
    /// always requesting human review. The roster is returned untouched.
    pub fn request_human_review(
        roster: &Roster,
        issues: &[ComplianceIssue],
    ) -> ResolutionOutcome {
        let mut outcome = ResolutionOutcome::new(roster.clone());
        for issue in issues {
            let subject = issue.employee_id.as_deref().unwrap_or("store");
            let description = format!("{} for {subject} requires manual handling", issue.code);
            outcome.warnings.push(description.clone());
            outcome.actions.push(ResolutionAction {
                description,
                success: false,
            });
            outcome.unresolved += 1;
        }
        outcome.requires_human_review = true;
        outcome
    }
}
