//! Roster generation.
//!
//! Builds an initial roster from employee availability, skills, station
//! staffing requirements and weekly-hour caps. The engine is pure over its
//! inputs: the caller fetches all reference data and passes it in, and the
//! engine performs no I/O. Unmet requirements become warnings and coverage
//! gaps in the result's metrics, never errors; a roster object is always
//! produced.

use chrono::Duration;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::config::ShiftCodeTable;
use crate::models::{
    AvailabilityRecord, CoverageGap, EmployeeContract, GenerationMetrics, PeriodType, Roster,
    Shift, SkillRecord, StaffRequirement,
};

/// Inputs to a roster-generation run, fetched by the caller.
#[derive(Debug, Clone)]
pub struct GenerationInputs<'a> {
    /// The store to roster.
    pub store_id: &'a str,
    /// First date of the scheduling week.
    pub week_start: NaiveDate,
    /// Last date of the scheduling week; defaults to `week_start + 6`.
    pub week_end: Option<NaiveDate>,
    /// Declared employee availability for the week.
    pub availability: &'a [AvailabilityRecord],
    /// Station skills per employee.
    pub skills: &'a [SkillRecord],
    /// Station staffing requirements.
    pub requirements: &'a [StaffRequirement],
    /// Employee contracts.
    pub contracts: &'a [EmployeeContract],
    /// The shift-code lookup table.
    pub shift_codes: &'a ShiftCodeTable,
}

/// The outcome of a roster-generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    /// The generated roster (possibly empty).
    pub roster: Roster,
    /// Assignment metrics and warnings.
    pub metrics: GenerationMetrics,
}

/// Builds initial rosters by constrained assignment of employees to
/// station/date slots.
pub struct RosterGenerationEngine;

impl RosterGenerationEngine {
    /// Generates a roster for the week.
    ///
    /// For each date and each NORMAL-period station requirement, the engine
    /// selects employees that are available that date, not yet assigned that
    /// date, under their weekly-hour cap, and skill-matched to the station
    /// (or holding the universal station skill). Candidates with fewer
    /// shifts already assigned are preferred, which spreads work fairly
    /// across the week.
    pub fn generate(inputs: &GenerationInputs<'_>) -> GenerationResult {
        let week_end = inputs
            .week_end
            .unwrap_or(inputs.week_start + Duration::days(6));
        let mut roster = Roster::empty(inputs.store_id, inputs.week_start);
        let mut metrics = GenerationMetrics::default();

        if week_end < inputs.week_start {
            warn!(
                store_id = inputs.store_id,
                "week end precedes week start, returning empty roster"
            );
            metrics
                .warnings
                .push(format!("invalid week: {} to {week_end}", inputs.week_start));
            return GenerationResult { roster, metrics };
        }

        if inputs.availability.is_empty() {
            metrics
                .warnings
                .push("no availability data for the week, roster left empty".to_string());
            return GenerationResult { roster, metrics };
        }
        if inputs.requirements.is_empty() {
            metrics
                .warnings
                .push("no staffing requirements for the store, roster left empty".to_string());
            return GenerationResult { roster, metrics };
        }

        let skills_by_employee: HashMap<&str, &SkillRecord> = inputs
            .skills
            .iter()
            .map(|s| (s.employee_id.as_str(), s))
            .collect();
        let contracts_by_employee: HashMap<&str, &EmployeeContract> = inputs
            .contracts
            .iter()
            .map(|c| (c.employee_id.as_str(), c))
            .collect();

        let mut hours_assigned: HashMap<String, Decimal> = HashMap::new();
        let mut shifts_assigned: HashMap<String, u32> = HashMap::new();

        let mut date = inputs.week_start;
        while date <= week_end {
            for requirement in inputs
                .requirements
                .iter()
                .filter(|r| r.period_type == PeriodType::Normal)
            {
                let station = station_code(requirement);
                let already = roster.staff_count(&station, date);
                let mut remaining =
                    (requirement.required_staff as usize).saturating_sub(already);
                if remaining == 0 {
                    continue;
                }

                let mut candidates: Vec<&AvailabilityRecord> = inputs
                    .availability
                    .iter()
                    .filter(|a| a.date == date && a.is_available())
                    .filter(|a| !roster.assigned_on(&a.employee_id, date))
                    .filter(|a| can_work_station(&skills_by_employee, &a.employee_id, &station))
                    .filter(|a| {
                        let window_hours = shift_hours(inputs.shift_codes, a);
                        let worked = hours_assigned
                            .get(&a.employee_id)
                            .copied()
                            .unwrap_or(Decimal::ZERO);
                        let cap = contracts_by_employee
                            .get(a.employee_id.as_str())
                            .map(|c| c.effective_max_hours())
                            .unwrap_or_else(|| {
                                EmployeeContract::fallback(&a.employee_id).effective_max_hours()
                            });
                        worked + window_hours <= cap
                    })
                    .collect();

                // Fairness tie-break: fewest shifts already assigned first.
                candidates.sort_by_key(|a| {
                    shifts_assigned
                        .get(&a.employee_id)
                        .copied()
                        .unwrap_or(0)
                });

                for record in candidates.into_iter().take(remaining) {
                    match build_shift(inputs.shift_codes, record, requirement, &station) {
                        Ok(shift) => {
                            let hours = shift.duration_hours();
                            *hours_assigned
                                .entry(record.employee_id.clone())
                                .or_insert(Decimal::ZERO) += hours;
                            *shifts_assigned
                                .entry(record.employee_id.clone())
                                .or_insert(0) += 1;
                            roster.shifts.push(shift);
                            remaining -= 1;
                        }
                        Err(e) => {
                            metrics.warnings.push(format!(
                                "skipped availability for {} on {date}: {e}",
                                record.employee_id
                            ));
                        }
                    }
                }

                if remaining > 0 {
                    debug!(
                        station = station.as_str(),
                        %date,
                        shortfall = remaining,
                        "requirement not met"
                    );
                    metrics.warnings.push(format!(
                        "station {station} on {date}: {remaining} of {} positions unfilled",
                        requirement.required_staff
                    ));
                    metrics.coverage_gaps.push(CoverageGap {
                        date,
                        station_id: requirement.station_id,
                        station_code: requirement.station_code.clone(),
                        shortfall: remaining as u32,
                    });
                }
            }
            date += Duration::days(1);
        }

        metrics.total_shifts = roster.shifts.len();
        metrics.employees_assigned = roster.employee_ids().len();
        GenerationResult { roster, metrics }
    }
}

fn station_code(requirement: &StaffRequirement) -> String {
    requirement
        .station_code
        .clone()
        .unwrap_or_else(|| requirement.station_id.to_string())
}

/// Employees with no skill record get universal station access; absence of
/// reference data degrades, it does not exclude.
fn can_work_station(
    skills: &HashMap<&str, &SkillRecord>,
    employee_id: &str,
    station: &str,
) -> bool {
    skills
        .get(employee_id)
        .map(|record| record.can_work(station))
        .unwrap_or(true)
}

fn shift_hours(table: &ShiftCodeTable, record: &AvailabilityRecord) -> Decimal {
    match (record.start_time, record.end_time) {
        (Some(start), Some(end)) if start < end => {
            let minutes = (end - start).num_minutes();
            Decimal::new(minutes, 0) / Decimal::new(60, 0)
        }
        _ => table.window(&record.shift_code).hours,
    }
}

fn build_shift(
    table: &ShiftCodeTable,
    record: &AvailabilityRecord,
    requirement: &StaffRequirement,
    station: &str,
) -> crate::error::EngineResult<Shift> {
    let window = table.window(&record.shift_code);
    let start_time = record.start_time.unwrap_or(window.start);
    let end_time = record.end_time.unwrap_or(window.end);
    let mut shift = Shift::new(
        &record.employee_id,
        record.date.and_time(start_time),
        record.date.and_time(end_time),
        station,
    )?;
    shift.station_id = Some(requirement.station_id);
    shift.shift_code = Some(record.shift_code.clone());
    Ok(shift)
}
