// crates/autonomy-orchestrator/src/roles.rs
// ============================================================================
// Module: Orchestrator Roles
// Description: Trait seams for the four role kinds the Role Orchestrator (C10) calls.
// Purpose: Keep planning, execution policy, memory, and audit pluggable and model agnostic.
// Dependencies: autonomy-core
// ============================================================================

//! Trait seams for the four role kinds the Role Orchestrator (C10) calls.

use autonomy_core::AuditReport;
use autonomy_core::ExecutionPlan;
use autonomy_core::Goal;
use autonomy_core::MemoryReport;
use autonomy_core::PipelineResult;

/// Errors raised by a role invocation. Distinct from [`crate::role_call::RoleCallError`],
/// which wraps this with retry/timeout/circuit-breaker context.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    /// The role could not produce a result for reasons specific to its
    /// backend (a model call failed, a memory backend was unreachable).
    #[error("role failed: {0}")]
    Failed(String),
}

/// Produces an [`ExecutionPlan`] pursuing a [`Goal`].
pub trait Planner: Send + Sync {
    /// Plans a goal into a dependency-ordered set of tool call steps.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError`] if planning fails.
    fn plan(&self, goal: &Goal) -> Result<ExecutionPlan, RoleError>;
}

/// Executes a single plan step through the Tool Execution Pipeline. Kept
/// distinct from `autonomy_kernel::Pipeline` itself so the orchestrator can
/// wrap execution in role-call policy (timeout, retry, circuit breaker)
/// uniformly with the other roles.
pub trait Executor: Send + Sync {
    /// Executes `step_index` of `plan`, returning the pipeline's result.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError`] if the step cannot be submitted to the
    /// pipeline; pipeline-level rejections are reported in the returned
    /// [`PipelineResult`], not as a `RoleError`.
    fn execute_step(&self, plan: &ExecutionPlan, step_index: usize) -> Result<PipelineResult, RoleError>;
}

/// Persists a durable summary of a completed plan for later recall.
pub trait MemoryWriter: Send + Sync {
    /// Writes memory records summarizing `plan`'s execution.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError`] if the write fails.
    fn write(&self, plan: &ExecutionPlan, step_results: &[PipelineResult]) -> Result<MemoryReport, RoleError>;
}

/// Reviews a completed plan's execution for anomalies.
pub trait Auditor: Send + Sync {
    /// Audits `plan`'s execution, returning any anomalies found.
    ///
    /// # Errors
    ///
    /// Returns [`RoleError`] if the audit itself could not run.
    fn audit(&self, plan: &ExecutionPlan, step_results: &[PipelineResult]) -> Result<AuditReport, RoleError>;
}
