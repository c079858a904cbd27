//! Scheduling engines: roster generation, compliance validation, conflict
//! resolution, cost optimization, and penalty-rate resolution.

mod compliance;
mod conflict;
mod generation;
mod optimization;
mod penalty_resolver;

pub use compliance::{ComplianceEngine, DEFAULT_MIN_REST_HOURS, rest_hours};
pub use conflict::{ConflictResolutionEngine, ResolutionAction, ResolutionOutcome};
pub use generation::{GenerationInputs, GenerationResult, RosterGenerationEngine};
pub use optimization::{
    ComplianceCheck, CostOptimizationEngine, OptimizationResult, PassThroughValidator,
    ValidationQuery, optimization_score,
};
pub use penalty_resolver::{PenaltyOutcome, resolve_penalty, shift_penalty, weekday_number};
