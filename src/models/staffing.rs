//! Staffing requirements, availability and skill records.
//!
//! These are read-only inputs fetched by the orchestrator from the data
//! providers and passed into the engines, which are pure over them.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// The skill code granting access to every station ("can work any station").
pub const ALL_STATIONS: &str = "ALL_STATIONS";

/// Markers in availability data meaning the employee is unavailable that day.
const UNAVAILABILITY_MARKERS: [&str; 4] = ["/", "NA", "OFF", "X"];

/// Returns true if the given shift code marks the employee as unavailable.
///
/// # Example
///
/// ```
/// use roster_engine::models::is_unavailable_marker;
///
/// assert!(is_unavailable_marker("OFF"));
/// assert!(is_unavailable_marker("/"));
/// assert!(!is_unavailable_marker("1F"));
/// ```
pub fn is_unavailable_marker(shift_code: &str) -> bool {
    UNAVAILABILITY_MARKERS.contains(&shift_code)
}

/// The staffing period a requirement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// Ordinary trading hours.
    Normal,
    /// Peak trading hours (lunch rush, weekends).
    Peak,
}

/// The required staff count for one station during one period type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffRequirement {
    /// The numeric station identifier.
    pub station_id: i64,
    /// The station code, when known.
    #[serde(default)]
    pub station_code: Option<String>,
    /// The period this requirement applies to.
    pub period_type: PeriodType,
    /// How many staff the station needs.
    pub required_staff: u32,
}

/// One employee's declared availability for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    /// The employee this record belongs to.
    pub employee_id: String,
    /// The date of the availability.
    pub date: NaiveDate,
    /// The declared shift code ("1F", "S", ...) or an unavailability marker.
    pub shift_code: String,
    /// Explicit start time overriding the shift-code window.
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    /// Explicit end time overriding the shift-code window.
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Station preference for the day, when declared.
    #[serde(default)]
    pub station_id: Option<i64>,
}

impl AvailabilityRecord {
    /// Returns true if this record marks the employee as available.
    pub fn is_available(&self) -> bool {
        !is_unavailable_marker(&self.shift_code)
    }
}

/// The stations an employee is trained to work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    /// The employee this record belongs to.
    pub employee_id: String,
    /// Station codes the employee can work, or [`ALL_STATIONS`].
    pub skills: Vec<String>,
}

impl SkillRecord {
    /// Returns true if the employee can work the given station.
    pub fn can_work(&self, station_code: &str) -> bool {
        self.skills
            .iter()
            .any(|s| s == station_code || s == ALL_STATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailability_markers() {
        for marker in ["/", "NA", "OFF", "X"] {
            assert!(is_unavailable_marker(marker), "{marker} should be a marker");
        }
        assert!(!is_unavailable_marker("1F"));
        assert!(!is_unavailable_marker("SC"));
        assert!(!is_unavailable_marker(""));
    }

    #[test]
    fn test_availability_record_is_available() {
        let mut record = AvailabilityRecord {
            employee_id: "e1".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 12, 8).unwrap(),
            shift_code: "1F".to_string(),
            start_time: None,
            end_time: None,
            station_id: None,
        };
        assert!(record.is_available());
        record.shift_code = "OFF".to_string();
        assert!(!record.is_available());
    }

    #[test]
    fn test_skill_record_matches_station() {
        let record = SkillRecord {
            employee_id: "e1".to_string(),
            skills: vec!["KITCHEN".to_string()],
        };
        assert!(record.can_work("KITCHEN"));
        assert!(!record.can_work("COUNTER"));
    }

    #[test]
    fn test_all_stations_skill_matches_everything() {
        let record = SkillRecord {
            employee_id: "e1".to_string(),
            skills: vec![ALL_STATIONS.to_string()],
        };
        assert!(record.can_work("KITCHEN"));
        assert!(record.can_work("COUNTER"));
        assert!(record.can_work("DRIVE_THRU"));
    }

    #[test]
    fn test_staff_requirement_deserialization() {
        let json = r#"{
            "station_id": 3,
            "station_code": "KITCHEN",
            "period_type": "normal",
            "required_staff": 2
        }"#;

        let requirement: StaffRequirement = serde_json::from_str(json).unwrap();
        assert_eq!(requirement.station_id, 3);
        assert_eq!(requirement.period_type, PeriodType::Normal);
        assert_eq!(requirement.required_staff, 2);
    }

    #[test]
    fn test_period_type_serialization() {
        assert_eq!(serde_json::to_string(&PeriodType::Normal).unwrap(), "\"normal\"");
        assert_eq!(serde_json::to_string(&PeriodType::Peak).unwrap(), "\"peak\"");
    }
}
