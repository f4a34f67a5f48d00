// crates/autonomy-orchestrator/src/lib.rs
// ============================================================================
// Crate: autonomy-orchestrator
// Description: Drives goals through Planner/Executor/MemoryWriter/Auditor roles.
// Purpose: Everything above a single pipeline call: plans, resilience, rewards, retention.
// Dependencies: autonomy-core, autonomy-kernel, thiserror, tracing
// ============================================================================

//! Implements components C10 through C14: the Role Orchestrator, the
//! role-call resilience policy shared by every role, the Reward/Trace
//! Collector, the Retention Manager, and the Projection Rebuilder.

pub mod orchestrator;
pub mod projection;
pub mod retention;
pub mod reward;
pub mod role_call;
pub mod roles;
pub mod trace;

pub use orchestrator::GoalAdmissionPolicy;
pub use orchestrator::Orchestrator;
pub use orchestrator::OrchestratorError;
pub use orchestrator::RoleBreakers;
pub use projection::RequestProjection;
pub use projection::rebuild_projections;
pub use retention::RetentionError;
pub use retention::RetentionExport;
pub use retention::export_and_evict;
pub use reward::checkpoint_reward;
pub use reward::episode_reward;
pub use role_call::CircuitBreaker;
pub use role_call::RoleCallError;
pub use role_call::RoleCallPolicy;
pub use role_call::call_with_policy;
pub use roles::Auditor;
pub use roles::Executor;
pub use roles::MemoryWriter;
pub use roles::Planner;
pub use roles::RoleError;
pub use trace::Episode;
pub use trace::RewardTier;
pub use trace::SourceTrust;
pub use trace::TraceCollector;
pub use trace::TrainingExample;
