//! Data model for the Roster Scheduling Engine.

mod compliance;
mod contract;
mod penalty;
mod roster;
mod shift;
mod staffing;

pub use compliance::{
    ComplianceIssue, ComplianceReport, ComplianceSuggestion, IssueCode, Severity, SuggestedChange,
    SuggestionType,
};
pub use contract::{EmployeeContract, EmploymentType};
pub use penalty::PenaltyRule;
pub use roster::{CoverageGap, GenerationMetrics, Roster};
pub use shift::Shift;
pub use staffing::{
    ALL_STATIONS, AvailabilityRecord, PeriodType, SkillRecord, StaffRequirement,
    is_unavailable_marker,
};
