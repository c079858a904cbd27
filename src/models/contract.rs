//! Employee contract model and employment types.
//!
//! Contracts are read-only reference data for a scheduling run. When no
//! contract exists for a rostered employee, a casual fallback contract is
//! substituted and a MINOR compliance issue is reported.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents the type of employment arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    /// Full-time employment (38 ordinary hours per week).
    FullTime,
    /// Part-time employment (regular pattern below full-time hours).
    PartTime,
    /// Casual employment (no guaranteed hours).
    Casual,
}

impl EmploymentType {
    /// Returns the weekly hour cap used by the roster generation engine.
    ///
    /// Full-time 38h, part-time 32h, casual 24h.
    pub fn weekly_hour_cap(&self) -> Decimal {
        match self {
            EmploymentType::FullTime => Decimal::new(38, 0),
            EmploymentType::PartTime => Decimal::new(32, 0),
            EmploymentType::Casual => Decimal::new(24, 0),
        }
    }

    /// Returns the weekly hour minimum below which a worked week is flagged
    /// as a shortfall (full-time 35h, part-time 20h, casual 8h).
    pub fn weekly_hour_minimum(&self) -> Decimal {
        match self {
            EmploymentType::FullTime => Decimal::new(35, 0),
            EmploymentType::PartTime => Decimal::new(20, 0),
            EmploymentType::Casual => Decimal::new(8, 0),
        }
    }
}

/// Read-only contract terms for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeContract {
    /// The employee this contract belongs to.
    pub employee_id: String,
    /// The type of employment arrangement.
    pub employment_type: EmploymentType,
    /// Contractual weekly hour maximum, overriding the employment-type cap.
    #[serde(default)]
    pub max_hours_week: Option<Decimal>,
    /// Contractual minimum rest between consecutive shifts, overriding policy.
    #[serde(default)]
    pub min_hours_between_shifts: Option<Decimal>,
    /// The station the employee is primarily trained for.
    #[serde(default)]
    pub default_station_code: Option<String>,
}

impl EmployeeContract {
    /// Fallback contract substituted when an employee has no stored contract:
    /// casual terms with no overrides.
    pub fn fallback(employee_id: impl Into<String>) -> Self {
        Self {
            employee_id: employee_id.into(),
            employment_type: EmploymentType::Casual,
            max_hours_week: None,
            min_hours_between_shifts: None,
            default_station_code: None,
        }
    }

    /// Returns the effective weekly hour maximum: the contractual override
    /// when present, else the employment-type cap.
    pub fn effective_max_hours(&self) -> Decimal {
        self.max_hours_week
            .unwrap_or_else(|| self.employment_type.weekly_hour_cap())
    }
}
