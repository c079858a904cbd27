//! Run orchestration: the planner that chooses the next engine and the
//! orchestrator that drives a roster-generation run end to end.

mod orchestrator;
mod planner;
mod trace;

pub use orchestrator::{DEFAULT_MAX_ITERATIONS, Orchestrator, RUN_TIMEOUT, RunMode};
pub use planner::{
    NextStep, PlannerDecision, PlannerFlags, QualityAssessment, assess_roster_quality, decide,
};
pub use trace::{
    AgentTraceEntry, OrchestrationResult, OrchestrationState, RunMetrics, RunStatus, WorkerKind,
};
