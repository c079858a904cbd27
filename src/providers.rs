//! Data-provider interfaces.
//!
//! The orchestrator consumes store data through the [`DataProvider`] trait.
//! Persistence, REST clients and seed loaders live behind this seam; the
//! crate itself ships only [`InMemoryDataProvider`] for tests and bootstrap.

use chrono::NaiveDate;

use crate::config::SchedulePolicy;
use crate::error::EngineResult;
use crate::models::{
    AvailabilityRecord, EmployeeContract, PenaltyRule, SkillRecord, StaffRequirement,
};

/// Asynchronous source of the store data a roster run needs.
///
/// Implementations return `Ok` with empty collections when they simply hold
/// no data; `Err` is reserved for lookup failures (the orchestrator degrades
/// those to warnings rather than aborting the run).
#[allow(async_fn_in_trait)]
pub trait DataProvider {
    /// Declared availability for a store over an inclusive date range.
    async fn availability(
        &self,
        store_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AvailabilityRecord>>;

    /// Station skills for the given employees.
    async fn skills(&self, employee_ids: &[String]) -> EngineResult<Vec<SkillRecord>>;

    /// Contracts for the given employees at a store.
    async fn contracts(
        &self,
        store_id: &str,
        employee_ids: &[String],
    ) -> EngineResult<Vec<EmployeeContract>>;

    /// Station staffing requirements for a store.
    async fn staffing_requirements(&self, store_id: &str)
    -> EngineResult<Vec<StaffRequirement>>;

    /// The store's scheduling policy, when one is configured.
    async fn policy(&self, store_id: &str) -> EngineResult<Option<SchedulePolicy>>;

    /// The store's penalty-rule list, when one is configured.
    async fn penalty_rules(&self, store_id: &str) -> EngineResult<Option<Vec<PenaltyRule>>>;
}

/// An in-memory provider backed by plain vectors.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataProvider {
    /// Availability records across all stores and dates.
    pub availability: Vec<AvailabilityRecord>,
    /// Skill records for all employees.
    pub skills: Vec<SkillRecord>,
    /// Contracts for all employees.
    pub contracts: Vec<EmployeeContract>,
    /// Staffing requirements for the store.
    pub requirements: Vec<StaffRequirement>,
    /// The scheduling policy, when configured.
    pub policy: Option<SchedulePolicy>,
    /// The penalty-rule list, when configured.
    pub penalty_rules: Option<Vec<PenaltyRule>>,
}

impl DataProvider for InMemoryDataProvider {
    async fn availability(
        &self,
        _store_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> EngineResult<Vec<AvailabilityRecord>> {
        Ok(self
            .availability
            .iter()
            .filter(|a| a.date >= from && a.date <= to)
            .cloned()
            .collect())
    }

    async fn skills(&self, employee_ids: &[String]) -> EngineResult<Vec<SkillRecord>> {
        Ok(self
            .skills
            .iter()
            .filter(|s| employee_ids.contains(&s.employee_id))
            .cloned()
            .collect())
    }

    async fn contracts(
        &self,
        _store_id: &str,
        employee_ids: &[String],
    ) -> EngineResult<Vec<EmployeeContract>> {
        Ok(self
            .contracts
            .iter()
            .filter(|c| employee_ids.contains(&c.employee_id))
            .cloned()
            .collect())
    }

    async fn staffing_requirements(
        &self,
        _store_id: &str,
    ) -> EngineResult<Vec<StaffRequirement>> {
        Ok(self.requirements.clone())
    }

    async fn policy(&self, _store_id: &str) -> EngineResult<Option<SchedulePolicy>> {
        Ok(self.policy.clone())
    }

    async fn penalty_rules(&self, _store_id: &str) -> EngineResult<Option<Vec<PenaltyRule>>> {
        Ok(self.penalty_rules.clone())
    }
}
