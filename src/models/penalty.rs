//! Penalty rule model.
//!
//! Penalty rules encode statutory pay loadings. Rule order matters: the
//! resolver evaluates holiday rules first, then day-of-week rules, then
//! time-range rules, and within each pass the first match wins. This
//! ordering encodes legal precedence (holiday pay supersedes weekend pay
//! supersedes time-of-day loading) and must not be reordered.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::EmploymentType;

/// A single penalty-rate rule. A `None` field matches any value of that
/// dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRule {
    /// Unique rule identifier.
    pub id: String,
    /// Day of week the rule applies to (0 = Sunday .. 6 = Saturday).
    #[serde(default)]
    pub day_of_week: Option<u8>,
    /// Start of the time-of-day window the rule applies to.
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    /// End of the time-of-day window the rule applies to.
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    /// Employment type the rule applies to.
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    /// The pay multiplier, always >= 1.
    pub multiplier: Decimal,
    /// Whether this rule applies on public holidays.
    #[serde(default)]
    pub is_public_holiday: bool,
    /// Human-readable description of the rule.
    pub description: String,
}
