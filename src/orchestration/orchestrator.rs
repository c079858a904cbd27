//! The run orchestrator.
//!
//! Owns the roster-generation pipeline: fetches store data through the
//! injected provider, then drives the engines either via the planner
//! (dynamic mode) or in a fixed sequence (fallback mode). Provider lookup
//! failures degrade to warnings; the run always produces a result.

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calendar::DEFAULT_REGION;
use crate::config::{SchedulePolicy, ShiftCodeTable, default_penalty_rules};
use crate::error::EngineResult;
use crate::models::{
    AvailabilityRecord, ComplianceReport, ComplianceSuggestion, CoverageGap, EmployeeContract,
    PenaltyRule, Roster, SkillRecord, StaffRequirement,
};
use crate::orchestration::planner::{NextStep, PlannerFlags, decide};
use crate::orchestration::trace::{
    AgentTraceEntry, OrchestrationResult, OrchestrationState, RunMetrics, RunStatus, WorkerKind,
};
use crate::providers::DataProvider;
use crate::scheduling::{
    ComplianceCheck, ComplianceEngine, ConflictResolutionEngine, CostOptimizationEngine,
    GenerationInputs, OptimizationResult, ResolutionOutcome, RosterGenerationEngine,
    ValidationQuery,
};

/// Default planner-loop iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

/// Wall-clock budget for one run.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// How a run is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// Planner-mediated loop.
    Dynamic,
    /// Fixed generate, validate, optimize sequence.
    Fallback,
}

/// Wires the compliance engine into the optimizer's speculative protocol.
struct EngineValidator<'a> {
    contracts: &'a [EmployeeContract],
    policy: Option<&'a SchedulePolicy>,
    rules: &'a [PenaltyRule],
    region: &'a str,
}

impl ComplianceCheck for EngineValidator<'_> {
    fn check(&self, roster: &Roster) -> ComplianceReport {
        ComplianceEngine::validate(
            roster,
            self.contracts,
            self.policy,
            Some(self.rules),
            Some(self.region),
        )
    }
}

/// Store data gathered before the engines run.
struct FetchedInputs {
    availability: Vec<AvailabilityRecord>,
    skills: Vec<SkillRecord>,
    contracts: Vec<EmployeeContract>,
    requirements: Vec<StaffRequirement>,
    policy: Option<SchedulePolicy>,
    penalty_rules: Option<Vec<PenaltyRule>>,
    warnings: Vec<String>,
}

/// Drives roster-generation runs end to end.
pub struct Orchestrator<P: DataProvider> {
    provider: P,
    shift_codes: ShiftCodeTable,
    max_iterations: u32,
    region: String,
}

impl<P: DataProvider> Orchestrator<P> {
    /// Creates an orchestrator over the given data provider.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            shift_codes: ShiftCodeTable::standard(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            region: DEFAULT_REGION.to_string(),
        }
    }

    /// Overrides the planner-loop iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Overrides the holiday region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Generates, validates and optimizes a roster for one store week.
    pub async fn generate_roster(
        &self,
        store_id: &str,
        week_start: NaiveDate,
        mode: RunMode,
    ) -> EngineResult<OrchestrationResult> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%run_id, store_id, %week_start, ?mode, "starting roster run");

        let inputs = self.fetch_inputs(store_id, week_start).await;
        let mut trace: Vec<AgentTraceEntry> = Vec::new();
        for warning in &inputs.warnings {
            push_trace(
                &mut trace,
                OrchestrationState::Initial,
                OrchestrationState::Initial,
                format!("degraded input: {warning}"),
            );
        }

        let result = match mode {
            RunMode::Dynamic => self.run_dynamic(run_id, store_id, week_start, &inputs, trace),
            RunMode::Fallback => self.run_fallback(run_id, store_id, week_start, &inputs, trace),
        };
        let mut result = result;
        result.metrics.total_duration_ms = started.elapsed().as_millis() as u64;
        info!(%run_id, status = ?result.status, "roster run finished");
        Ok(result)
    }

    async fn fetch_inputs(&self, store_id: &str, week_start: NaiveDate) -> FetchedInputs {
        let week_end = week_start + ChronoDuration::days(6);
        let mut warnings = Vec::new();

        let availability = match self.provider.availability(store_id, week_start, week_end).await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "availability lookup failed");
                warnings.push(format!("availability lookup failed: {e}"));
                Vec::new()
            }
        };

        let mut employee_ids: Vec<String> =
            availability.iter().map(|a| a.employee_id.clone()).collect();
        employee_ids.sort();
        employee_ids.dedup();

        let skills = match self.provider.skills(&employee_ids).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "skills lookup failed");
                warnings.push(format!("skills lookup failed: {e}"));
                Vec::new()
            }
        };
        let contracts = match self.provider.contracts(store_id, &employee_ids).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "contracts lookup failed");
                warnings.push(format!("contracts lookup failed: {e}"));
                Vec::new()
            }
        };
        let requirements = match self.provider.staffing_requirements(store_id).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "staffing-requirements lookup failed");
                warnings.push(format!("staffing-requirements lookup failed: {e}"));
                Vec::new()
            }
        };
        let policy = match self.provider.policy(store_id).await {
            Ok(policy) => policy,
            Err(e) => {
                warn!(error = %e, "policy lookup failed");
                warnings.push(format!("policy lookup failed: {e}"));
                None
            }
        };
        let penalty_rules = match self.provider.penalty_rules(store_id).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "penalty-rule lookup failed");
                warnings.push(format!("penalty-rule lookup failed: {e}"));
                None
            }
        };

        FetchedInputs {
            availability,
            skills,
            contracts,
            requirements,
            policy,
            penalty_rules,
            warnings,
        }
    }

    fn run_dynamic(
        &self,
        run_id: Uuid,
        store_id: &str,
        week_start: NaiveDate,
        inputs: &FetchedInputs,
        mut trace: Vec<AgentTraceEntry>,
    ) -> OrchestrationResult {
        let started = Instant::now();
        let effective_rules = inputs
            .penalty_rules
            .clone()
            .unwrap_or_else(default_penalty_rules);

        let mut state = OrchestrationState::Initial;
        let mut flags = PlannerFlags::default();
        let mut roster = Roster::empty(store_id, week_start);
        let mut gaps: Vec<CoverageGap> = Vec::new();
        let mut pending_suggestions: Vec<ComplianceSuggestion> = Vec::new();
        let mut compliance: Option<ComplianceReport> = None;
        let mut optimization: Option<OptimizationResult> = None;
        let mut conflict_resolution: Option<ResolutionOutcome> = None;
        let mut iteration = 0u32;

        let status = loop {
            if started.elapsed() >= RUN_TIMEOUT {
                push_trace(
                    &mut trace,
                    state,
                    OrchestrationState::RequiresHumanReview,
                    "wall-clock budget exhausted".to_string(),
                );
                break RunStatus::Partial;
            }

            let decision = decide(state, &flags, iteration, self.max_iterations);
            match decision.next {
                NextStep::Done => {
                    push_trace(
                        &mut trace,
                        state,
                        OrchestrationState::Completed,
                        decision.reason,
                    );
                    break RunStatus::Ok;
                }
                NextStep::HumanReview => {
                    let status = if flags.optimization_attempted
                        && state == OrchestrationState::FinalValidationFailed
                        && !flags.has_critical
                    {
                        RunStatus::OptimizationFailed
                    } else {
                        RunStatus::RequiresHumanReview
                    };
                    push_trace(
                        &mut trace,
                        state,
                        OrchestrationState::RequiresHumanReview,
                        decision.reason,
                    );
                    break status;
                }
                NextStep::Worker(WorkerKind::RosterGeneration) => {
                    let result = RosterGenerationEngine::generate(&GenerationInputs {
                        store_id,
                        week_start,
                        week_end: None,
                        availability: &inputs.availability,
                        skills: &inputs.skills,
                        requirements: &inputs.requirements,
                        contracts: &inputs.contracts,
                        shift_codes: &self.shift_codes,
                    });
                    gaps = result.metrics.coverage_gaps.clone();
                    flags.has_gaps = !gaps.is_empty();
                    push_trace(
                        &mut trace,
                        state,
                        OrchestrationState::RosterGenerated,
                        format!(
                            "generated {} shifts for {} employees",
                            result.metrics.total_shifts, result.metrics.employees_assigned
                        ),
                    );
                    roster = result.roster;
                    state = OrchestrationState::RosterGenerated;
                }
                NextStep::Worker(WorkerKind::Compliance) => {
                    let report = ComplianceEngine::validate(
                        &roster,
                        &inputs.contracts,
                        inputs.policy.as_ref(),
                        inputs.penalty_rules.as_deref(),
                        Some(&self.region),
                    );
                    flags.has_issues = !report.issues.is_empty();
                    flags.has_critical = report.has_critical();
                    flags.has_suggestions = !report.suggestions.is_empty();
                    pending_suggestions = report.suggestions.clone();

                    let next_state = if flags.optimization_attempted {
                        if report.passed {
                            OrchestrationState::FinalValidationPassed
                        } else {
                            flags.final_validation_retries += 1;
                            OrchestrationState::FinalValidationFailed
                        }
                    } else if flags.has_issues {
                        OrchestrationState::ComplianceHasIssues
                    } else {
                        OrchestrationState::ComplianceValidated
                    };
                    push_trace(&mut trace, state, next_state, report.summary.clone());
                    compliance = Some(report);
                    state = next_state;
                }
                NextStep::Worker(WorkerKind::Conflict) => {
                    let mut outcome =
                        ConflictResolutionEngine::apply_suggestions(&roster, &pending_suggestions);
                    pending_suggestions.clear();
                    flags.has_suggestions = false;

                    if !gaps.is_empty() {
                        let gap_outcome = ConflictResolutionEngine::resolve_coverage_gaps(
                            &outcome.roster,
                            &gaps,
                            &inputs.availability,
                            &inputs.skills,
                            &inputs.contracts,
                            &self.shift_codes,
                        );
                        flags.has_gaps = gap_outcome.unresolved > 0;
                        gaps.clear();
                        outcome = outcome.merge(gap_outcome);
                    }

                    // Critical findings stand only while corrections failed.
                    flags.has_critical = flags.has_critical && outcome.unresolved > 0;
                    roster = outcome.roster.clone();
                    push_trace(
                        &mut trace,
                        state,
                        OrchestrationState::ConflictsResolved,
                        format!(
                            "resolved {} of {} actions",
                            outcome.resolved,
                            outcome.resolved + outcome.unresolved
                        ),
                    );
                    conflict_resolution = Some(match conflict_resolution.take() {
                        Some(previous) => previous.merge(outcome),
                        None => outcome,
                    });
                    state = OrchestrationState::ConflictsResolved;
                }
                NextStep::Worker(WorkerKind::Optimization) => {
                    let validator = EngineValidator {
                        contracts: &inputs.contracts,
                        policy: inputs.policy.as_ref(),
                        rules: &effective_rules,
                        region: &self.region,
                    };
                    let result = CostOptimizationEngine::optimize(
                        &roster,
                        &pending_suggestions,
                        &inputs.contracts,
                        &effective_rules,
                        Some(&self.region),
                        &validator,
                    );
                    pending_suggestions.clear();
                    flags.has_suggestions = false;
                    flags.optimization_attempted = true;
                    roster = result.roster.clone();
                    push_trace(
                        &mut trace,
                        state,
                        OrchestrationState::Optimized,
                        format!(
                            "cost {} -> {} ({} moves, score {})",
                            result.initial_cost,
                            result.final_cost,
                            result.optimizations_applied,
                            result.score
                        ),
                    );
                    push_validation_queries(&mut trace, &result.validation_queries);
                    optimization = Some(result);
                    state = OrchestrationState::Optimized;
                }
            }
            iteration += 1;
        };

        let validation_queries_count = optimization
            .as_ref()
            .map(|o| o.validation_queries.len())
            .unwrap_or(0);

        OrchestrationResult {
            run_id,
            roster,
            compliance,
            optimization,
            conflict_resolution,
            agent_trace: trace,
            metrics: RunMetrics {
                total_duration_ms: 0,
                validation_queries_count,
            },
            status,
        }
    }

    fn run_fallback(
        &self,
        run_id: Uuid,
        store_id: &str,
        week_start: NaiveDate,
        inputs: &FetchedInputs,
        mut trace: Vec<AgentTraceEntry>,
    ) -> OrchestrationResult {
        let effective_rules = inputs
            .penalty_rules
            .clone()
            .unwrap_or_else(default_penalty_rules);

        let generated = RosterGenerationEngine::generate(&GenerationInputs {
            store_id,
            week_start,
            week_end: None,
            availability: &inputs.availability,
            skills: &inputs.skills,
            requirements: &inputs.requirements,
            contracts: &inputs.contracts,
            shift_codes: &self.shift_codes,
        });
        push_trace(
            &mut trace,
            OrchestrationState::Initial,
            OrchestrationState::RosterGenerated,
            format!("generated {} shifts", generated.metrics.total_shifts),
        );
        let roster = generated.roster;

        let report = ComplianceEngine::validate(
            &roster,
            &inputs.contracts,
            inputs.policy.as_ref(),
            inputs.penalty_rules.as_deref(),
            Some(&self.region),
        );
        if report.has_critical() {
            push_trace(
                &mut trace,
                OrchestrationState::RosterGenerated,
                OrchestrationState::RequiresHumanReview,
                report.summary.clone(),
            );
            return OrchestrationResult {
                run_id,
                roster,
                compliance: Some(report),
                optimization: None,
                conflict_resolution: None,
                agent_trace: trace,
                metrics: RunMetrics {
                    total_duration_ms: 0,
                    validation_queries_count: 0,
                },
                status: RunStatus::RequiresHumanReview,
            };
        }
        push_trace(
            &mut trace,
            OrchestrationState::RosterGenerated,
            OrchestrationState::ComplianceValidated,
            report.summary.clone(),
        );

        let validator = EngineValidator {
            contracts: &inputs.contracts,
            policy: inputs.policy.as_ref(),
            rules: &effective_rules,
            region: &self.region,
        };
        let optimized = CostOptimizationEngine::optimize(
            &roster,
            &[],
            &inputs.contracts,
            &effective_rules,
            Some(&self.region),
            &validator,
        );
        push_trace(
            &mut trace,
            OrchestrationState::ComplianceValidated,
            OrchestrationState::Optimized,
            format!(
                "cost {} -> {}",
                optimized.initial_cost, optimized.final_cost
            ),
        );
        push_validation_queries(&mut trace, &optimized.validation_queries);
        push_trace(
            &mut trace,
            OrchestrationState::Optimized,
            OrchestrationState::Completed,
            "fallback sequence complete".to_string(),
        );
        let validation_queries_count = optimized.validation_queries.len();
        let final_roster = optimized.roster.clone();

        OrchestrationResult {
            run_id,
            roster: final_roster,
            compliance: Some(report),
            optimization: Some(optimized),
            conflict_resolution: None,
            agent_trace: trace,
            metrics: RunMetrics {
                total_duration_ms: 0,
                validation_queries_count,
            },
            status: RunStatus::Ok,
        }
    }
}

/// Appends one trace entry per speculative validation query/response pair.
fn push_validation_queries(trace: &mut Vec<AgentTraceEntry>, queries: &[ValidationQuery]) {
    for query in queries {
        let action = if query.passed {
            format!("validation query: {} -> passed", query.description)
        } else {
            format!(
                "validation query: {} -> rejected ({})",
                query.description,
                query.failure_reason.as_deref().unwrap_or("no reason given")
            )
        };
        push_trace(
            trace,
            OrchestrationState::Optimized,
            OrchestrationState::Optimized,
            action,
        );
    }
}

fn push_trace(
    trace: &mut Vec<AgentTraceEntry>,
    from: OrchestrationState,
    to: OrchestrationState,
    action: String,
) {
    trace.push(AgentTraceEntry {
        timestamp: Utc::now(),
        from,
        to,
        action,
    });
}
