// crates/autonomy-orchestrator/tests/orchestrated_pipeline.rs
// ============================================================================
// Test: Role Orchestrator driving a real Tool Execution Pipeline
// Description: Exercises plan execution, dependency gating, and reward scoring together.
// Dependencies: autonomy-core, autonomy-kernel, autonomy-orchestrator
// ============================================================================

//! Exercises plan execution, dependency gating, and reward scoring together.

use std::sync::Arc;

use autonomy_core::ActionError;
use autonomy_core::ActionHandler;
use autonomy_core::AuditReport;
use autonomy_core::CallSource;
use autonomy_core::ExecutionPlan;
use autonomy_core::Goal;
use autonomy_core::GoalPriority;
use autonomy_core::MemoryReport;
use autonomy_core::PipelineResult;
use autonomy_core::PlanStatus;
use autonomy_core::PlanStep;
use autonomy_core::ProposedToolCall;
use autonomy_core::RiskClass;
use autonomy_core::SystemClock;
use autonomy_core::Timestamp;
use autonomy_core::ToolContract;
use autonomy_kernel::ApprovalGate;
use autonomy_kernel::ApprovalPolicy;
use autonomy_kernel::CheckRegistry;
use autonomy_kernel::CompensationRegistry;
use autonomy_kernel::InMemoryEventStore;
use autonomy_kernel::Pipeline;
use autonomy_kernel::ToolAccessPolicy;
use autonomy_kernel::ToolRegistry;
use autonomy_orchestrator::Auditor;
use autonomy_orchestrator::Executor;
use autonomy_orchestrator::GoalAdmissionPolicy;
use autonomy_orchestrator::MemoryWriter;
use autonomy_orchestrator::Orchestrator;
use autonomy_orchestrator::Planner;
use autonomy_orchestrator::RoleCallPolicy;
use autonomy_orchestrator::RoleError;
use autonomy_orchestrator::checkpoint_reward;
use autonomy_orchestrator::episode_reward;
use autonomy_orchestrator::reward::DEFAULT_TARGET_DURATION_MS;
use time::macros::datetime;

fn ts() -> Timestamp {
    Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC))
}

fn goal() -> Goal {
    Goal::new("g1", "ship the feature", GoalPriority::Normal, "user", 1.0, ts())
}

struct FixedPlanner(Vec<PlanStep>);

impl Planner for FixedPlanner {
    fn plan(&self, goal: &Goal) -> Result<ExecutionPlan, RoleError> {
        Ok(ExecutionPlan::new("p1", goal.goal_id.clone(), self.0.clone()))
    }
}

fn step(id: &str, tool_name: &str, depends_on: &[&str]) -> PlanStep {
    PlanStep {
        step_id: id.into(),
        tool_name: tool_name.into(),
        params: serde_json::json!({}),
        depends_on: depends_on.iter().map(|dependency| (*dependency).into()).collect(),
    }
}

struct OkHandler;

impl ActionHandler for OkHandler {
    fn execute(&self, call: &ProposedToolCall) -> Result<serde_json::Value, ActionError> {
        Ok(call.params.clone())
    }
}

/// Runs each plan step through a real [`Pipeline`], mapping the step's
/// `plan_id`/`step_id` into a [`CallSource::Plan`] provenance.
struct PipelineExecutor(Pipeline);

impl Executor for PipelineExecutor {
    fn execute_step(&self, plan: &ExecutionPlan, step_index: usize) -> Result<PipelineResult, RoleError> {
        let step = plan.steps.get(step_index).ok_or_else(|| RoleError::Failed(format!("no step at index {step_index}")))?;
        let call = ProposedToolCall {
            request_id: format!("{}-{}", plan.plan_id.as_str(), step.step_id.as_str()).into(),
            correlation_id: plan.plan_id.as_str().into(),
            agent_id: "agent-1".into(),
            tool_name: step.tool_name.clone(),
            params: step.params.clone(),
            source: CallSource::Plan {
                plan_id: plan.plan_id.clone(),
                step_id: step.step_id.clone(),
            },
            proposed_at: ts(),
        };
        self.0.execute(call).map_err(|err| RoleError::Failed(err.to_string()))
    }
}

struct NoopMemoryWriter;

impl MemoryWriter for NoopMemoryWriter {
    fn write(&self, _plan: &ExecutionPlan, _step_results: &[PipelineResult]) -> Result<MemoryReport, RoleError> {
        Ok(MemoryReport {
            total: 0,
            allowed: 0,
            quarantined: 0,
            rejected: 0,
        })
    }
}

struct CleanAuditor;

impl Auditor for CleanAuditor {
    fn audit(&self, _plan: &ExecutionPlan, _step_results: &[PipelineResult]) -> Result<AuditReport, RoleError> {
        Ok(AuditReport {
            drift_report: autonomy_core::DriftReport::none(),
            anomalies: Vec::new(),
            recommendations: Vec::new(),
        })
    }
}

fn pipeline_with_tools(tools: &[&str]) -> Pipeline {
    let mut tool_registry = ToolRegistry::new(ToolAccessPolicy::allow_all());
    for tool in tools {
        tool_registry
            .register(ToolContract::builder(*tool, RiskClass::Routine).build())
            .expect("registration");
    }
    let tool_names: Vec<String> = tools.iter().map(|tool| (*tool).to_string()).collect();
    Pipeline::new(
        Arc::new(tool_registry),
        Arc::new(ApprovalGate::new(ApprovalPolicy::conservative_default())),
        Arc::new(move |name: &str| if tool_names.iter().any(|tool| tool == name) { Some(Arc::new(OkHandler) as Arc<dyn ActionHandler>) } else { None }),
        Arc::new(CheckRegistry::new()),
        Arc::new(CheckRegistry::new()),
        Arc::new(CompensationRegistry::new()),
        Arc::new(InMemoryEventStore::default()),
        Arc::new(SystemClock),
    )
}

/// A plan whose steps all succeed completes cleanly and every step scores a
/// positive checkpoint reward.
#[test]
fn plan_with_satisfied_dependencies_completes_and_scores_positively() {
    let pipeline = pipeline_with_tools(&["fetch_data", "summarize"]);
    let planner = FixedPlanner(vec![step("a", "fetch_data", &[]), step("b", "summarize", &["a"])]);
    let orchestrator: Orchestrator<_, _, NoopMemoryWriter, CleanAuditor> = Orchestrator::new(
        planner,
        PipelineExecutor(pipeline),
        None,
        None,
        RoleCallPolicy::default_policy(),
        GoalAdmissionPolicy::default_policy(),
    );

    let result = orchestrator.run(&goal()).expect("run");
    assert_eq!(result.plan_status, PlanStatus::Completed);
    assert_eq!(result.step_results.len(), 2);
    assert!(result.is_clean_success());

    let reward = episode_reward(&result, ts());
    assert!(reward.total > 0.0);
    for step_result in &result.step_results {
        assert!((checkpoint_reward(step_result, DEFAULT_TARGET_DURATION_MS, ts()).total - 1.0).abs() < f64::EPSILON);
    }
}

/// A step whose dependency never ran (because the tool is unregistered and
/// validation rejects it) halts the plan; the dependent step never runs.
#[test]
fn a_failed_dependency_halts_the_plan_before_the_dependent_step_runs() {
    let pipeline = pipeline_with_tools(&["summarize"]);
    let planner = FixedPlanner(vec![step("a", "fetch_data", &[]), step("b", "summarize", &["a"])]);
    let orchestrator: Orchestrator<_, _, NoopMemoryWriter, CleanAuditor> = Orchestrator::new(
        planner,
        PipelineExecutor(pipeline),
        None,
        None,
        RoleCallPolicy::default_policy(),
        GoalAdmissionPolicy::default_policy(),
    );

    let result = orchestrator.run(&goal()).expect("run");
    assert_eq!(result.plan_status, PlanStatus::Failed);
    assert_eq!(result.step_results.len(), 1);
    assert!(!result.step_results[0].succeeded());
}
