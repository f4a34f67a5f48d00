// crates/autonomy-orchestrator/src/orchestrator.rs
// ============================================================================
// Module: Role Orchestrator (C10)
// Description: Drives a goal through Planner -> Executor -> MemoryWriter -> Auditor.
// Purpose: The orchestrator's single entry point: pursue one goal to a terminal result.
// Dependencies: autonomy-core, autonomy-kernel
// ============================================================================

//! Drives a goal through Planner -> Executor -> MemoryWriter -> Auditor.

use autonomy_core::Anomaly;
use autonomy_core::AnomalySeverity;
use autonomy_core::AuditReport;
use autonomy_core::DriftReport;
use autonomy_core::ExecutionPlan;
use autonomy_core::Goal;
use autonomy_core::OrchestratedResult;
use autonomy_core::PipelineResult;
use autonomy_core::PipelineStatus;
use autonomy_core::PlanId;
use autonomy_core::PlanStatus;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::role_call::CircuitBreaker;
use crate::role_call::RoleCallError;
use crate::role_call::RoleCallPolicy;
use crate::role_call::call_with_policy;
use crate::roles::Auditor;
use crate::roles::Executor;
use crate::roles::MemoryWriter;
use crate::roles::Planner;
use crate::roles::RoleError;

/// Errors the orchestrator cannot attribute to the goal itself.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The plan failed validation (duplicate steps, unknown dependency, or
    /// a cycle) before any step ran.
    #[error("invalid plan: {0}")]
    InvalidPlan(#[from] autonomy_core::PlanError),
    /// The planner role could not produce a plan after retries.
    #[error("planning failed: {0}")]
    Planning(String),
}

/// Governs which goals are admitted before planning runs at all, mirroring
/// the role-call authorization check applied to every other role
/// invocation: a source must clear a trust floor and, if the allow-list is
/// non-empty, appear on it. `source == "user"` is always admitted
/// regardless of `source_trust`, per the goal data model's own invariant.
#[derive(Debug, Clone)]
pub struct GoalAdmissionPolicy {
    /// Minimum `source_trust` a non-`"user"` source must carry.
    pub min_source_trust: f64,
    /// Sources explicitly authorized to submit goals. Empty means no
    /// source-name restriction beyond `min_source_trust`.
    pub allowed_sources: Vec<String>,
}

impl GoalAdmissionPolicy {
    /// The default policy: user-sourced goals are always admitted, every
    /// other source needs `source_trust >= 0.6` and no source-name
    /// restriction.
    #[must_use]
    pub fn default_policy() -> Self {
        Self {
            min_source_trust: 0.6,
            allowed_sources: Vec::new(),
        }
    }

    /// Whether `goal` clears admission, assuming its `source_trust` has
    /// already been checked for validity.
    #[must_use]
    pub fn authorizes(&self, goal: &Goal) -> bool {
        goal.source == "user"
            || (goal.source_trust >= self.min_source_trust
                && (self.allowed_sources.is_empty() || self.allowed_sources.iter().any(|source| source == &goal.source)))
    }
}

/// Circuit breakers for each role, held across goals so a failing backend
/// stays tripped between invocations rather than resetting per call.
pub struct RoleBreakers {
    /// Breaker guarding the planner.
    pub planner: CircuitBreaker,
    /// Breaker guarding the executor.
    pub executor: CircuitBreaker,
    /// Breaker guarding the memory writer.
    pub memory_writer: CircuitBreaker,
    /// Breaker guarding the auditor.
    pub auditor: CircuitBreaker,
}

impl RoleBreakers {
    /// Creates four independent breakers under the same policy.
    #[must_use]
    pub fn new(policy: RoleCallPolicy) -> Self {
        Self {
            planner: CircuitBreaker::new(policy),
            executor: CircuitBreaker::new(policy),
            memory_writer: CircuitBreaker::new(policy),
            auditor: CircuitBreaker::new(policy),
        }
    }
}

/// Drives goals to completion by calling the four role traits in sequence,
/// under a shared [`RoleCallPolicy`].
pub struct Orchestrator<P, E, M, A> {
    planner: P,
    executor: E,
    memory_writer: Option<M>,
    auditor: Option<A>,
    policy: RoleCallPolicy,
    breakers: RoleBreakers,
    admission: GoalAdmissionPolicy,
}

impl<P, E, M, A> Orchestrator<P, E, M, A>
where
    P: Planner,
    E: Executor,
    M: MemoryWriter,
    A: Auditor,
{
    /// Creates an orchestrator. Memory writing and auditing are optional:
    /// omit either to skip that phase entirely.
    #[must_use]
    pub fn new(
        planner: P,
        executor: E,
        memory_writer: Option<M>,
        auditor: Option<A>,
        policy: RoleCallPolicy,
        admission: GoalAdmissionPolicy,
    ) -> Self {
        Self {
            planner,
            executor,
            memory_writer,
            auditor,
            breakers: RoleBreakers::new(policy),
            policy,
            admission,
        }
    }

    /// Denies admission up front, producing a terminal result with an
    /// anomaly recorded but no plan ever generated.
    fn deny_admission(goal: &Goal, description: String) -> OrchestratedResult {
        warn!(goal_id = %goal.goal_id, "{description}");
        OrchestratedResult {
            goal_id: goal.goal_id.clone(),
            plan_id: PlanId::new(format!("denied-{}", goal.goal_id)),
            plan_status: PlanStatus::Failed,
            step_results: Vec::new(),
            memory: None,
            audit: Some(AuditReport {
                drift_report: DriftReport::none(),
                anomalies: vec![Anomaly {
                    severity: AnomalySeverity::Warning,
                    description,
                    related_request_id: None,
                }],
                recommendations: Vec::new(),
            }),
        }
    }

    /// Plans and executes `goal`, writing memory and auditing if those
    /// roles are configured.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError`] if planning fails or the generated
    /// plan is structurally invalid. Step-level execution failures, and
    /// admission denial, are reported in the returned [`OrchestratedResult`],
    /// not as an error.
    pub fn run(&self, goal: &Goal) -> Result<OrchestratedResult, OrchestratorError> {
        if !goal.has_valid_source_trust() {
            return Ok(Self::deny_admission(
                goal,
                format!("malformed admission request: sourceTrust {} outside [0,1]", goal.source_trust),
            ));
        }
        if !self.admission.authorizes(goal) {
            return Ok(Self::deny_admission(
                goal,
                format!(
                    "Role call denied: planner.createPlan source={} sourceTrust={}",
                    goal.source, goal.source_trust
                ),
            ));
        }

        let plan = self.plan(goal)?;
        plan.validate()?;

        let mut step_results = Vec::with_capacity(plan.steps.len());
        let mut plan_status = PlanStatus::InProgress;

        for step_index in 0..plan.steps.len() {
            let Some(dependencies_satisfied) = self.dependencies_satisfied(&plan, step_index, &step_results) else {
                plan_status = PlanStatus::Failed;
                break;
            };
            if !dependencies_satisfied {
                plan_status = PlanStatus::Failed;
                break;
            }
            let result = call_with_policy(&self.policy, &self.breakers.executor, || {
                self.executor.execute_step(&plan, step_index)
            });
            match result {
                Ok(pipeline_result) => {
                    let succeeded = pipeline_result.succeeded();
                    step_results.push(pipeline_result);
                    if !succeeded {
                        plan_status = PlanStatus::Failed;
                        break;
                    }
                }
                Err(err) => {
                    error!(step_index, "executor role call failed: {err}");
                    plan_status = PlanStatus::Failed;
                    break;
                }
            }
        }

        if plan_status == PlanStatus::InProgress {
            plan_status = PlanStatus::Completed;
        }

        let memory = self.run_memory_writer(&plan, &step_results);
        let audit = self.run_auditor(&plan, &step_results);

        info!(goal_id = %goal.goal_id, status = ?plan_status, "orchestrated run finished");

        Ok(OrchestratedResult {
            goal_id: goal.goal_id.clone(),
            plan_id: plan.plan_id,
            plan_status,
            step_results,
            memory,
            audit,
        })
    }

    fn plan(&self, goal: &Goal) -> Result<ExecutionPlan, OrchestratorError> {
        call_with_policy(&self.policy, &self.breakers.planner, || self.planner.plan(goal)).map_err(|err| match err {
            RoleCallError::CircuitOpen => OrchestratorError::Planning("planner circuit breaker open".to_string()),
            RoleCallError::Exhausted(RoleError::Failed(detail)) => OrchestratorError::Planning(detail),
        })
    }

    fn dependencies_satisfied(&self, plan: &ExecutionPlan, step_index: usize, step_results: &[PipelineResult]) -> Option<bool> {
        let step = plan.steps.get(step_index)?;
        Some(step.depends_on.iter().all(|dependency| {
            plan.steps
                .iter()
                .position(|candidate| &candidate.step_id == dependency)
                .and_then(|index| step_results.get(index))
                .is_some_and(|result| matches!(result.status, PipelineStatus::Succeeded))
        }))
    }

    fn run_memory_writer(&self, plan: &ExecutionPlan, step_results: &[PipelineResult]) -> Option<autonomy_core::MemoryReport> {
        let writer = self.memory_writer.as_ref()?;
        match call_with_policy(&self.policy, &self.breakers.memory_writer, || writer.write(plan, step_results)) {
            Ok(report) => Some(report),
            Err(err) => {
                error!("memory writer role call failed: {err}");
                None
            }
        }
    }

    fn run_auditor(&self, plan: &ExecutionPlan, step_results: &[PipelineResult]) -> Option<autonomy_core::AuditReport> {
        let auditor = self.auditor.as_ref()?;
        match call_with_policy(&self.policy, &self.breakers.auditor, || auditor.audit(plan, step_results)) {
            Ok(report) => Some(report),
            Err(err) => {
                error!("auditor role call failed: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use autonomy_core::GoalPriority;
    use autonomy_core::PlanStep;
    use autonomy_core::RequestId;
    use autonomy_core::Timestamp;
    use time::macros::datetime;

    use super::*;

    struct FixedPlanner(Vec<PlanStep>);

    impl Planner for FixedPlanner {
        fn plan(&self, goal: &Goal) -> Result<ExecutionPlan, RoleError> {
            Ok(ExecutionPlan::new("p1", goal.goal_id.clone(), self.0.clone()))
        }
    }

    struct AlwaysSucceedsExecutor;

    impl Executor for AlwaysSucceedsExecutor {
        fn execute_step(&self, _plan: &ExecutionPlan, _step_index: usize) -> Result<PipelineResult, RoleError> {
            Ok(PipelineResult {
                request_id: RequestId::new("r1"),
                tool_name: "noop".into(),
                status: PipelineStatus::Succeeded,
                validation: autonomy_core::ValidationResult::valid(),
                approval: None,
                execution_output: None,
                verification: None,
                invariants: None,
                compensation: None,
                duration_ms: 0,
                error: None,
            })
        }
    }

    struct NoopMemoryWriter;

    impl MemoryWriter for NoopMemoryWriter {
        fn write(&self, _plan: &ExecutionPlan, _step_results: &[PipelineResult]) -> Result<autonomy_core::MemoryReport, RoleError> {
            Ok(autonomy_core::MemoryReport {
                total: 0,
                allowed: 0,
                quarantined: 0,
                rejected: 0,
            })
        }
    }

    struct CleanAuditor;

    impl Auditor for CleanAuditor {
        fn audit(&self, _plan: &ExecutionPlan, _step_results: &[PipelineResult]) -> Result<autonomy_core::AuditReport, RoleError> {
            Ok(autonomy_core::AuditReport {
                drift_report: DriftReport::none(),
                anomalies: Vec::new(),
                recommendations: Vec::new(),
            })
        }
    }

    fn goal() -> Goal {
        Goal::new(
            "g1",
            "do the thing",
            GoalPriority::Normal,
            "user",
            1.0,
            Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC)),
        )
    }

    fn step(id: &str) -> PlanStep {
        PlanStep {
            step_id: id.into(),
            tool_name: "noop".into(),
            params: serde_json::json!({}),
            depends_on: Vec::new(),
        }
    }

    #[test]
    fn clean_run_produces_completed_status() {
        let orchestrator = Orchestrator::new(
            FixedPlanner(vec![step("a")]),
            AlwaysSucceedsExecutor,
            Some(NoopMemoryWriter),
            Some(CleanAuditor),
            RoleCallPolicy::default_policy(),
            GoalAdmissionPolicy::default_policy(),
        );
        let result = orchestrator.run(&goal()).expect("run");
        assert_eq!(result.plan_status, PlanStatus::Completed);
        assert!(result.is_clean_success());
    }

    #[test]
    fn omitting_memory_and_audit_roles_skips_them() {
        let orchestrator: Orchestrator<_, _, NoopMemoryWriter, CleanAuditor> = Orchestrator::new(
            FixedPlanner(vec![step("a")]),
            AlwaysSucceedsExecutor,
            None,
            None,
            RoleCallPolicy::default_policy(),
            GoalAdmissionPolicy::default_policy(),
        );
        let result = orchestrator.run(&goal()).expect("run");
        assert!(result.memory.is_none());
        assert!(result.audit.is_none());
    }

    #[test]
    fn malformed_source_trust_is_denied_before_planning() {
        let orchestrator: Orchestrator<_, _, NoopMemoryWriter, CleanAuditor> = Orchestrator::new(
            FixedPlanner(vec![step("a")]),
            AlwaysSucceedsExecutor,
            None,
            None,
            RoleCallPolicy::default_policy(),
            GoalAdmissionPolicy::default_policy(),
        );
        let mut goal = goal();
        goal.source = "agent".to_string();
        goal.source_trust = 1.5;
        let result = orchestrator.run(&goal).expect("run");
        assert_eq!(result.plan_status, PlanStatus::Failed);
        assert!(result.step_results.is_empty());
        assert!(result.audit.expect("audit").anomalies[0].description.contains("malformed"));
    }

    #[test]
    fn untrusted_agent_source_is_denied_by_role_call_authorization() {
        let orchestrator: Orchestrator<_, _, NoopMemoryWriter, CleanAuditor> = Orchestrator::new(
            FixedPlanner(vec![step("a")]),
            AlwaysSucceedsExecutor,
            None,
            None,
            RoleCallPolicy::default_policy(),
            GoalAdmissionPolicy::default_policy(),
        );
        let mut goal = goal();
        goal.source = "agent".to_string();
        goal.source_trust = 0.1;
        let result = orchestrator.run(&goal).expect("run");
        assert_eq!(result.plan_status, PlanStatus::Failed);
        assert!(result.audit.expect("audit").anomalies[0].description.contains("Role call denied"));
    }

    #[test]
    fn user_sourced_goal_is_admitted_regardless_of_trust() {
        let orchestrator = Orchestrator::new(
            FixedPlanner(vec![step("a")]),
            AlwaysSucceedsExecutor,
            Some(NoopMemoryWriter),
            Some(CleanAuditor),
            RoleCallPolicy::default_policy(),
            GoalAdmissionPolicy::default_policy(),
        );
        let mut goal = goal();
        goal.source = "user".to_string();
        goal.source_trust = 0.0;
        let result = orchestrator.run(&goal).expect("run");
        assert_eq!(result.plan_status, PlanStatus::Completed);
    }
}
