//! Roster model and generation metrics.
//!
//! A roster is the full set of shifts for one store for one week. The roster
//! is owned exclusively by whichever engine is currently processing it:
//! engines receive a roster, clone it, mutate the clone, and return the
//! clone. That ownership discipline is what makes the optimizer's
//! speculative-apply protocol safe without locks.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Shift;

/// The full set of shifts for one store for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    /// The store this roster belongs to.
    pub store_id: String,
    /// The first date of the scheduling week.
    pub week_start: NaiveDate,
    /// The shifts of the roster, in assignment order.
    pub shifts: Vec<Shift>,
    /// When this roster was generated.
    pub generated_at: NaiveDateTime,
}

impl Roster {
    /// Creates an empty roster for a store and week.
    pub fn empty(store_id: impl Into<String>, week_start: NaiveDate) -> Self {
        Self {
            store_id: store_id.into(),
            week_start,
            shifts: Vec::new(),
            generated_at: Utc::now().naive_utc(),
        }
    }

    /// Returns the distinct employee ids assigned in this roster, ordered.
    pub fn employee_ids(&self) -> BTreeSet<String> {
        self.shifts.iter().map(|s| s.employee_id.clone()).collect()
    }

    /// Returns `(index, shift)` pairs for one employee, in chronological order.
    pub fn shifts_for_employee(&self, employee_id: &str) -> Vec<(usize, &Shift)> {
        let mut shifts: Vec<(usize, &Shift)> = self
            .shifts
            .iter()
            .enumerate()
            .filter(|(_, s)| s.employee_id == employee_id)
            .collect();
        shifts.sort_by_key(|(_, s)| s.start);
        shifts
    }

    /// Returns the total rostered hours for one employee.
    pub fn total_hours_for(&self, employee_id: &str) -> Decimal {
        self.shifts
            .iter()
            .filter(|s| s.employee_id == employee_id)
            .map(|s| s.duration_hours())
            .sum()
    }

    /// Returns true if the employee already has a shift on the given date.
    pub fn assigned_on(&self, employee_id: &str, date: NaiveDate) -> bool {
        self.shifts
            .iter()
            .any(|s| s.employee_id == employee_id && s.date() == date)
    }

    /// Counts the shifts assigned to one station on one date.
    ///
    /// This is true per-date counting, not a weekly aggregate divided by
    /// seven.
    pub fn staff_count(&self, station: &str, date: NaiveDate) -> usize {
        self.shifts
            .iter()
            .filter(|s| s.station == station && s.date() == date)
            .count()
    }
}

/// A station/date/period where assigned staff count is below the required
/// count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageGap {
    /// The date of the gap.
    pub date: NaiveDate,
    /// The numeric station identifier.
    pub station_id: i64,
    /// The station code, when known.
    #[serde(default)]
    pub station_code: Option<String>,
    /// How many staff are still missing.
    pub shortfall: u32,
}

/// Metrics describing a roster-generation run. Unmet requirements are
/// reportable outcomes here, never errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetrics {
    /// Total number of shifts assigned.
    pub total_shifts: usize,
    /// Number of distinct employees assigned.
    pub employees_assigned: usize,
    /// Human-readable warnings (unmet requirements, missing data).
    pub warnings: Vec<String>,
    /// Structured unmet requirements, consumed by conflict resolution.
    pub coverage_gaps: Vec<CoverageGap>,
}
