//! Error types for the Roster Scheduling Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Expected business conditions (compliance violations, coverage gaps,
//! missing reference data) are never errors; they surface as issues and
//! warnings on engine results instead. Only genuinely unexpected failures
//! (bad configuration, malformed input shapes) use these types.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the Roster Scheduling Engine.
///
/// # Example
///
/// ```
/// use roster_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/policy.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/policy.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A shift was invalid or contained inconsistent data.
    #[error("Invalid shift for employee '{employee_id}': {message}")]
    InvalidShift {
        /// The employee the shift was being built for.
        employee_id: String,
        /// A description of what made the shift invalid.
        message: String,
    },

    /// A scheduling week was invalid (end before start, out of range).
    #[error("Invalid week starting {week_start}: {message}")]
    InvalidWeek {
        /// The requested week start date.
        week_start: NaiveDate,
        /// A description of what made the week invalid.
        message: String,
    },

    /// An external data provider failed to deliver reference data.
    #[error("Data provider '{provider}' failed: {message}")]
    ProviderError {
        /// The provider that failed (availability, contracts, ...).
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/policy.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/policy.yaml"
        );
    }

    #[test]
    fn test_invalid_shift_displays_employee_and_message() {
        let error = EngineError::InvalidShift {
            employee_id: "e1".to_string(),
            message: "end time before start time".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid shift for employee 'e1': end time before start time"
        );
    }

    #[test]
    fn test_invalid_week_displays_date_and_message() {
        let error = EngineError::InvalidWeek {
            week_start: NaiveDate::from_ymd_opt(2025, 12, 8).unwrap(),
            message: "week end precedes week start".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid week starting 2025-12-08: week end precedes week start"
        );
    }

    #[test]
    fn test_provider_error_displays_provider_and_message() {
        let error = EngineError::ProviderError {
            provider: "availability".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Data provider 'availability' failed: connection refused"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_config_not_found() -> EngineResult<()> {
            Err(EngineError::ConfigNotFound {
                path: "/test".to_string(),
            })
        }

        fn propagates_error() -> EngineResult<()> {
            returns_config_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
