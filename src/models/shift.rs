//! Shift model.
//!
//! A shift is one employee's single work interval at a station, on a single
//! civil date. Shifts are plain values; engines clone and rebuild them rather
//! than mutating a caller's roster in place.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents one employee's single work interval at a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// The employee assigned to this shift.
    pub employee_id: String,
    /// The start of the shift.
    pub start: NaiveDateTime,
    /// The end of the shift. Invariant: `start < end`.
    pub end: NaiveDateTime,
    /// The station code the shift is worked at (e.g., "KITCHEN").
    pub station: String,
    /// Numeric station identifier, when known.
    #[serde(default)]
    pub station_id: Option<i64>,
    /// The shift code that produced this shift's window (e.g., "1F").
    #[serde(default)]
    pub shift_code: Option<String>,
    /// Whether the shift covers a peak staffing period.
    #[serde(default)]
    pub is_peak: bool,
    /// Optional base hourly rate override for cost estimation.
    #[serde(default)]
    pub base_rate: Option<Decimal>,
}

impl Shift {
    /// Creates a new shift, enforcing the `start < end` invariant.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidShift`] when `start >= end`.
    ///
    /// # Example
    ///
    /// ```
    /// use roster_engine::models::Shift;
    /// use chrono::NaiveDateTime;
    ///
    /// let start = NaiveDateTime::parse_from_str("2025-12-08 09:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let end = NaiveDateTime::parse_from_str("2025-12-08 17:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
    /// let shift = Shift::new("e1", start, end, "COUNTER").unwrap();
    /// assert_eq!(shift.duration_hours().to_string(), "8");
    /// ```
    pub fn new(
        employee_id: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
        station: impl Into<String>,
    ) -> EngineResult<Self> {
        let employee_id = employee_id.into();
        if start >= end {
            return Err(EngineError::InvalidShift {
                employee_id,
                message: format!("start {start} is not before end {end}"),
            });
        }
        Ok(Self {
            employee_id,
            start,
            end,
            station: station.into(),
            station_id: None,
            shift_code: None,
            is_peak: false,
            base_rate: None,
        })
    }

    /// Returns the shift duration in hours.
    pub fn duration_hours(&self) -> Decimal {
        let minutes = (self.end - self.start).num_minutes();
        Decimal::new(minutes, 0) / Decimal::new(60, 0)
    }

    /// Returns the civil date the shift falls on (date of the start).
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// Returns the day of the week of the shift.
    pub fn day_of_week(&self) -> Weekday {
        self.start.date().weekday()
    }
}
