//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading store
//! scheduling configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::PenaltyRule;

use super::types::SchedulePolicy;

/// A store's file-based scheduling configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// The scheduling policy.
    pub policy: SchedulePolicy,
    /// The ordered penalty-rule list.
    pub penalty_rules: Vec<PenaltyRule>,
}

/// Loads and provides access to store scheduling configuration.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/retail/
/// ├── policy.yaml         # Scheduling policy (rest, consecutive days, ...)
/// └── penalty_rules.yaml  # Ordered penalty-rate rules
/// ```
///
/// # Example
///
/// ```no_run
/// use roster_engine::config::ConfigLoader;
///
/// let config = ConfigLoader::load("./config/retail").unwrap();
/// println!("Minimum rest: {}h", config.policy.min_hours_between_shifts);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns an error if either file is missing or contains invalid YAML.
    /// Callers degrade rather than abort: a missing policy falls back to
    /// [`SchedulePolicy::default`] with a MINOR issue, missing penalty rules
    /// become a CRITICAL issue.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<StoreConfig> {
        let path = path.as_ref();

        let policy_path = path.join("policy.yaml");
        let policy = Self::load_yaml::<SchedulePolicy>(&policy_path)?;

        let rules_path = path.join("penalty_rules.yaml");
        let penalty_rules = Self::load_yaml::<Vec<PenaltyRule>>(&rules_path)?;

        Ok(StoreConfig {
            policy,
            penalty_rules,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }
}
