//! Run state, trace and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ComplianceReport, Roster};
use crate::scheduling::{OptimizationResult, ResolutionOutcome};

/// The processing state of one roster-generation run.
///
/// Created fresh per run; transitions are owned exclusively by the
/// orchestrator, driven by planner decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationState {
    /// Nothing has run yet.
    Initial,
    /// A roster draft exists.
    RosterGenerated,
    /// Compliance ran and found nothing.
    ComplianceValidated,
    /// Compliance ran and found issues.
    ComplianceHasIssues,
    /// Conflict resolution ran.
    ConflictsResolved,
    /// Cost optimization ran.
    Optimized,
    /// The post-optimization check passed.
    FinalValidationPassed,
    /// The post-optimization check failed.
    FinalValidationFailed,
    /// The run was escalated to a human.
    RequiresHumanReview,
    /// The run finished.
    Completed,
}

/// The engine a planner decision dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerKind {
    /// The roster generation engine.
    RosterGeneration,
    /// The compliance engine.
    Compliance,
    /// The conflict resolution engine.
    Conflict,
    /// The cost optimization engine.
    Optimization,
}

/// One step in the run's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTraceEntry {
    /// When the step happened.
    pub timestamp: DateTime<Utc>,
    /// The state before the step.
    pub from: OrchestrationState,
    /// The state after the step.
    pub to: OrchestrationState,
    /// What happened.
    pub action: String,
}

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The run produced a compliant roster.
    Ok,
    /// The run needs a human decision.
    RequiresHumanReview,
    /// Optimization could not converge to a compliant roster.
    OptimizationFailed,
    /// The run was cut short by the wall-clock budget.
    Partial,
}

/// Aggregate run metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Wall-clock duration of the run in milliseconds.
    pub total_duration_ms: u64,
    /// Speculative validation rounds across the run.
    pub validation_queries_count: usize,
}

/// The full outcome of a roster-generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    /// Unique identifier of this run.
    pub run_id: Uuid,
    /// The final roster.
    pub roster: Roster,
    /// The last compliance report, when compliance ran.
    #[serde(default)]
    pub compliance: Option<ComplianceReport>,
    /// The optimization result, when optimization ran.
    #[serde(default)]
    pub optimization: Option<OptimizationResult>,
    /// The combined conflict-resolution outcome, when conflict ran.
    #[serde(default)]
    pub conflict_resolution: Option<ResolutionOutcome>,
    /// The audit trail, one entry per engine invocation.
    pub agent_trace: Vec<AgentTraceEntry>,
    /// Aggregate metrics.
    pub metrics: RunMetrics,
    /// Terminal status.
    pub status: RunStatus,
}
